//! Permission probe for global input observation.
//!
//! macOS gates event taps behind the accessibility grant; Windows and other
//! platforms have no such gate.

use inputhook_core::PrivilegeState;

/// Check whether this process may observe global input.
///
/// On macOS an untrusted process triggers the system consent prompt as a
/// side effect and gets [`PrivilegeState::PromptShown`]. The grant usually
/// only takes effect after the process restarts.
pub fn probe_privilege() -> PrivilegeState {
    #[cfg(target_os = "macos")]
    {
        macos::probe()
    }

    #[cfg(not(target_os = "macos"))]
    {
        PrivilegeState::Normal
    }
}

#[cfg(target_os = "macos")]
mod macos {
    use core_foundation::base::TCFType;
    use core_foundation::boolean::CFBoolean;
    use core_foundation::dictionary::{CFDictionary, CFDictionaryRef};
    use core_foundation::string::{CFString, CFStringRef};
    use inputhook_core::PrivilegeState;
    use tracing::{debug, info};

    #[link(name = "ApplicationServices", kind = "framework")]
    extern "C" {
        static kAXTrustedCheckOptionPrompt: CFStringRef;
        fn AXIsProcessTrusted() -> bool;
        fn AXIsProcessTrustedWithOptions(options: CFDictionaryRef) -> bool;
    }

    pub fn probe() -> PrivilegeState {
        if unsafe { AXIsProcessTrusted() } {
            debug!("Process is trusted for accessibility");
            return PrivilegeState::Normal;
        }

        let key = unsafe { CFString::wrap_under_get_rule(kAXTrustedCheckOptionPrompt) };
        let options = CFDictionary::from_CFType_pairs(&[(
            key.as_CFType(),
            CFBoolean::true_value().as_CFType(),
        )]);
        let trusted = unsafe { AXIsProcessTrustedWithOptions(options.as_concrete_TypeRef()) };

        if trusted {
            info!("Accessibility permission granted during probe");
            PrivilegeState::GrantedImmediately
        } else {
            info!("Accessibility permission missing, system prompt opened");
            PrivilegeState::PromptShown
        }
    }
}
