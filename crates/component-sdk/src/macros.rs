//! Declarative macros for component modules.

/// Export component factories and the module's destroy function.
///
/// Each entry maps an exported symbol name to a constructor taking the
/// configuration string and returning `Option<C>` for some `C: Component`.
/// `None`, or a panic inside the constructor, makes the factory return null.
/// Invoke the macro once per module: it also exports
/// [`DESTROY_SYMBOL`](crate::DESTROY_SYMBOL).
///
/// # Example
///
/// ```ignore
/// use component_sdk::prelude::*;
///
/// struct Counter;
///
/// impl Component for Counter {}
///
/// export_components! {
///     Counter_Factory => |_config: &str| Some(Counter),
/// }
/// ```
#[macro_export]
macro_rules! export_components {
    ($($factory:ident => $ctor:expr),+ $(,)?) => {
        $(
            #[no_mangle]
            #[allow(non_snake_case)]
            pub unsafe extern "C" fn $factory(
                config: *const u8,
                config_len: usize,
            ) -> *mut ::std::ffi::c_void {
                let config = $crate::abi::config_from_raw(config, config_len);
                let created = ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| {
                    ($ctor)(&*config)
                }));
                match created {
                    Ok(Some(component)) => $crate::abi::into_raw(component),
                    _ => ::std::ptr::null_mut(),
                }
            }
        )+

        #[no_mangle]
        pub unsafe extern "C" fn component_destroy(component: *mut ::std::ffi::c_void) {
            // A panic must not unwind across the C boundary.
            let _ = ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| {
                $crate::abi::destroy_raw(component)
            }));
        }
    };
}
