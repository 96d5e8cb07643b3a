use crate::{
    command::Command, command_bus::CommandBus, command_handler::CommandHandler,
    context::AppContext, error::AppError,
};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::any::{Any, TypeId, type_name};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

type Erased = Box<dyn Any + Send>;

type ErasedFuture<'a> = Pin<Box<dyn Future<Output = Result<Erased, AppError>> + Send + 'a>>;

type ErasedHandler = Arc<dyn for<'a> Fn(Erased, &'a AppContext) -> ErasedFuture<'a> + Send + Sync>;

fn erase<F>(f: F) -> ErasedHandler
where
    F: for<'a> Fn(Erased, &'a AppContext) -> ErasedFuture<'a> + Send + Sync + 'static,
{
    Arc::new(f)
}

#[derive(Clone)]
struct Route {
    name: &'static str,
    call: ErasedHandler,
}

/// 进程内命令总线
///
/// 按命令的 `TypeId` 路由，每种命令只允许一个处理器；
/// 处理器以类型擦除的闭包保存，分发时还原为 `C::Output`。
#[derive(Default)]
pub struct InMemoryCommandBus {
    routes: DashMap<TypeId, Route>,
}

impl InMemoryCommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册命令处理器，同一命令重复注册返回 `AlreadyRegisteredCommand`
    pub fn register<C, H>(&self, handler: Arc<H>) -> Result<(), AppError>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        let Entry::Vacant(slot) = self.routes.entry(TypeId::of::<C>()) else {
            return Err(AppError::AlreadyRegisteredCommand {
                command: type_name::<C>(),
            });
        };

        let call = erase(move |payload, ctx| {
            let handler = handler.clone();
            Box::pin(async move {
                let cmd = payload
                    .downcast::<C>()
                    .map_err(|_| AppError::TypeMismatch {
                        expected: type_name::<C>(),
                        found: "unknown",
                    })?;
                let out = handler.handle(ctx, *cmd).await?;
                Ok::<_, AppError>(Box::new(out) as Erased)
            })
        });
        slot.insert(Route {
            name: C::NAME,
            call,
        });
        Ok(())
    }

    pub fn registered_commands(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.routes.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names
    }
}

#[async_trait]
impl CommandBus for InMemoryCommandBus {
    async fn dispatch<C>(&self, ctx: &AppContext, cmd: C) -> Result<C::Output, AppError>
    where
        C: Command,
    {
        let route = self
            .routes
            .get(&TypeId::of::<C>())
            .map(|r| r.value().clone())
            .ok_or(AppError::HandlerNotFound(type_name::<C>()))?;
        debug!(command = route.name, "dispatch");

        let out = (route.call)(Box::new(cmd), ctx).await?;
        out.downcast::<C::Output>()
            .map(|out| *out)
            .map_err(|_| AppError::TypeMismatch {
                expected: type_name::<C::Output>(),
                found: "unknown",
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::task::JoinSet;

    #[derive(Debug)]
    struct Rename {
        name: String,
    }

    impl Command for Rename {
        const NAME: &'static str = "rename";
        type Output = usize;
    }

    struct RenameHandler {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CommandHandler<Rename> for RenameHandler {
        async fn handle(&self, _ctx: &AppContext, cmd: Rename) -> Result<usize, AppError> {
            if cmd.name.is_empty() {
                return Err(AppError::Validation("name must not be empty".into()));
            }
            Ok(self.calls.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    fn handler(calls: &Arc<AtomicUsize>) -> Arc<RenameHandler> {
        Arc::new(RenameHandler {
            calls: calls.clone(),
        })
    }

    #[tokio::test]
    async fn routes_to_registered_handler_and_returns_output() {
        let bus = InMemoryCommandBus::new();
        let calls = Arc::new(AtomicUsize::new(0));
        bus.register::<Rename, _>(handler(&calls)).unwrap();

        let ctx = AppContext::default();
        let n = bus
            .dispatch(&ctx, Rename { name: "Acme".into() })
            .await
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(bus.registered_commands(), vec!["rename"]);

        let err = bus
            .dispatch(&ctx, Rename { name: String::new() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let bus = InMemoryCommandBus::new();
        let calls = Arc::new(AtomicUsize::new(0));
        bus.register::<Rename, _>(handler(&calls)).unwrap();
        let err = bus.register::<Rename, _>(handler(&calls)).unwrap_err();
        assert!(matches!(err, AppError::AlreadyRegisteredCommand { .. }));
    }

    #[tokio::test]
    async fn not_found_when_unregistered() {
        let bus = InMemoryCommandBus::new();
        let err = bus
            .dispatch(&AppContext::default(), Rename { name: "x".into() })
            .await
            .unwrap_err();
        match err {
            AppError::HandlerNotFound(name) => assert!(name.contains("Rename")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_dispatch_is_safe() {
        let bus = Arc::new(InMemoryCommandBus::new());
        let calls = Arc::new(AtomicUsize::new(0));
        bus.register::<Rename, _>(handler(&calls)).unwrap();

        let mut set = JoinSet::new();
        for i in 0..50 {
            let bus = bus.clone();
            set.spawn(async move {
                let ctx = AppContext::default();
                bus.dispatch(&ctx, Rename { name: format!("org-{i}") })
                    .await
                    .unwrap()
            });
        }
        let mut results = Vec::new();
        while let Some(res) = set.join_next().await {
            results.push(res.unwrap());
        }
        results.sort_unstable();
        assert_eq!(results.first(), Some(&1));
        assert_eq!(results.last(), Some(&50));
    }
}
