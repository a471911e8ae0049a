// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#[allow(unused_imports)]
pub(crate) use reflux_core::{debug, error, info, warn};
