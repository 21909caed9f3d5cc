// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod registry;
mod runtime;
mod settings;
mod store;

pub mod consts;

pub use registry::{HandlerRegistry, RegistryBuilder};
pub use runtime::RuntimeBuilder;
pub use settings::{
    AwsCredentials, ConsumerSettings, PushoverSettings, QueueSettings, ReceiveErrorPolicy,
    Settings,
};
pub use store::{ConfigStore, ConfigValue, EnvConfigStore, YamlConfigStore};
