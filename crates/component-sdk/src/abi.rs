//! C ABI shared by the host and component modules.

use std::borrow::Cow;
use std::ffi::c_void;

use crate::component::Component;

/// Factory exported by a module.
///
/// Receives the configuration string as a UTF-8 pointer/length pair and
/// returns a component allocated by [`into_raw`], or null when it cannot
/// construct one.
pub type ComponentFactoryFn =
    unsafe extern "C" fn(config: *const u8, config_len: usize) -> *mut c_void;

/// Destroy function exported by a module under [`crate::DESTROY_SYMBOL`].
pub type ComponentDestroyFn = unsafe extern "C" fn(component: *mut c_void);

/// Move a component onto the heap and erase it to a thin pointer.
///
/// The pointer refers to a `Box<dyn Component>` and must only be released
/// through [`destroy_raw`] in the same module.
pub fn into_raw<C: Component + 'static>(component: C) -> *mut c_void {
    let component: Box<dyn Component> = Box::new(component);
    Box::into_raw(Box::new(component)) as *mut c_void
}

/// Release a component previously returned by [`into_raw`]. Null is ignored.
///
/// # Safety
/// `component` must be null or come from [`into_raw`] in this module, and must
/// not be used afterwards.
pub unsafe fn destroy_raw(component: *mut c_void) {
    if component.is_null() {
        return;
    }
    drop(Box::from_raw(component as *mut Box<dyn Component>));
}

/// Borrow the configuration string handed to a factory.
///
/// Invalid UTF-8 is replaced rather than rejected.
///
/// # Safety
/// `config` must be null or valid for reads of `config_len` bytes for the
/// lifetime `'a`.
pub unsafe fn config_from_raw<'a>(config: *const u8, config_len: usize) -> Cow<'a, str> {
    if config.is_null() || config_len == 0 {
        return Cow::Borrowed("");
    }
    let bytes = std::slice::from_raw_parts(config, config_len);
    String::from_utf8_lossy(bytes)
}
