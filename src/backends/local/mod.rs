// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod extractors;
pub mod factory;

pub use extractors::*;
pub use factory::LocalExtractorFactory;
