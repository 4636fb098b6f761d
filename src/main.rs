/*!
 * Green Dispatch Demo
 *
 * Dispatches the same operation under every available green mode:
 * - waiting for the result
 * - through an accessor resolved afterwards
 */

use green_dispatch::{
    get_executor, init_tracing, Dispatch, Green, GreenBinding, GreenCall, GreenMode, GreenRuntime,
    GreenTarget,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Stand-in for a device proxy bound to the runtime default
#[derive(Debug, Default)]
struct Device {
    binding: GreenBinding,
}

impl GreenTarget for Device {
    fn green_mode(&self) -> Option<GreenMode> {
        self.binding.green_mode()
    }

    fn executor_override(&self, mode: GreenMode) -> Option<Arc<dyn green_dispatch::Executor>> {
        self.binding.executor_override(mode)
    }
}

fn main() -> miette::Result<()> {
    init_tracing();

    let runtime = GreenRuntime::global();
    info!(default_mode = %runtime.default_mode(), "Green dispatch demo starting");

    let device = Arc::new(Device::default());
    let double = Green::new("double", |_: &Device, x: i64| x * 2);

    for mode in GreenMode::ALL {
        if !runtime.registry().supports(mode) {
            warn!(mode = %mode, "Mode not compiled in, skipping");
            continue;
        }
        // Fail here, with a diagnostic, if the backend cannot start
        get_executor(mode)?;

        let waited = double.call(&device, 21, GreenCall::new().mode(mode).wait(true))?;
        if let Dispatch::Ready(value) = waited {
            info!(mode = %mode, value, "Waited for result");
        }

        if mode.is_synchronous() {
            continue;
        }
        let deferred = double.call(&device, 50, GreenCall::new().mode(mode).no_wait())?;
        let value = deferred.wait(Some(Duration::from_secs(5)))?;
        info!(mode = %mode, value, "Resolved accessor");
    }

    info!(initialized = ?runtime.registry().initialized_modes(), "Demo complete");
    Ok(())
}
