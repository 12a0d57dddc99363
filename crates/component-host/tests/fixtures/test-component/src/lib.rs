//! Test Component Module
//!
//! Built as `libTest_Component.so` / `Test_Component.dll` and loaded by the
//! component-host integration tests.

#![allow(non_snake_case)]

use component_sdk::prelude::*;

/// Component that echoes its construction arguments to stdout.
pub struct TestComponent {
    config: String,
}

impl TestComponent {
    fn new(config: &str) -> Self {
        println!("TestComponent created (config: {:?})", config);
        Self {
            config: config.to_string(),
        }
    }
}

impl Component for TestComponent {}

impl Drop for TestComponent {
    fn drop(&mut self) {
        println!("TestComponent destroyed (config: {:?})", self.config);
    }
}

fn create(config: &str) -> Option<TestComponent> {
    Some(TestComponent::new(config))
}

fn refuse(_config: &str) -> Option<TestComponent> {
    None
}

export_components! {
    Test_Component_Factory => create,
    Null_Component_Factory => refuse,
}
