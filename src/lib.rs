// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // repositories and extractors
pub mod cache;      // file-locked result cache
pub mod config;     // config + runtime builder
pub mod engine;     // calculator
pub mod errors;     // error handling
pub mod model;      // work items, records, object references
pub mod observability;
pub mod traits;     // repository and extractor abstractions
pub mod work;       // hierarchy walking and plane enumeration
