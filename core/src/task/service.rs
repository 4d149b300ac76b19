use futures_util::future::BoxFuture;
use std::sync::Arc;

pub type AsyncServiceError = String;
pub type AsyncServiceResult<T> = Result<T, AsyncServiceError>;
pub type AsyncServiceFuture = BoxFuture<'static, AsyncServiceResult<()>>;

pub trait AsyncService: Send + Sync {
    fn ident(self: Arc<Self>) -> &'static str;
    fn start(self: Arc<Self>) -> AsyncServiceFuture;
    fn signal_exit(self: Arc<Self>);
    fn stop(self: Arc<Self>) -> AsyncServiceFuture;
}
