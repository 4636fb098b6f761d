/*!
 * Executor Layer
 *
 * The executor contract shared by every green mode, the handles it hands
 * out, and the built-in synchronous executor.
 */

pub mod accessor;
pub mod synchronous;
pub mod traits;

pub use accessor::{completion, job, Accessor, Completer, Dispatch, Job, Payload, RawAccessor, RawDispatch};
pub use synchronous::SynchronousExecutor;
pub use traits::{same_executor, Executor, ExecutorExt};
