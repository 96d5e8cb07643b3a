use crate::{
    context::AppContext, error::AppError, query::Query, query_bus::QueryBus,
    query_handler::QueryHandler,
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

/// 进程内查询总线，每种查询类型对应唯一处理器
#[derive(Default)]
pub struct InMemoryQueryBus {
    routes: DashMap<TypeId, Route>,
}

impl InMemoryQueryBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<Q, H>(&self, handler: Arc<H>) -> Result<(), AppError>
    where
        Q: Query,
        H: QueryHandler<Q> + 'static,
    {
        let entry = match self.routes.entry(TypeId::of::<Q>()) {
            Entry::Occupied(_) => {
                return Err(AppError::AlreadyRegisteredQuery {
                    query: type_name::<Q>(),
                });
            }
            Entry::Vacant(entry) => entry,
        };

        let call = erase(move |payload, ctx| {
            let handler = handler.clone();
            Box::pin(async move {
                let query = payload
                    .downcast::<Q>()
                    .map_err(|_| AppError::TypeMismatch {
                        expected: type_name::<Q>(),
                        found: "unknown",
                    })?;
                let dto = handler.handle(ctx, *query).await?;
                Ok::<_, AppError>(Box::new(dto) as Erased)
            })
        });
        entry.insert(Route {
            name: Q::NAME,
            call,
        });
        Ok(())
    }

    /// 已注册的查询名
    pub fn registered_queries(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.routes.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names
    }
}

#[async_trait]
impl QueryBus for InMemoryQueryBus {
    async fn dispatch<Q>(&self, ctx: &AppContext, q: Q) -> Result<Q::Dto, AppError>
    where
        Q: Query,
    {
        let route = self
            .routes
            .get(&TypeId::of::<Q>())
            .map(|r| r.value().clone())
            .ok_or(AppError::HandlerNotFound(type_name::<Q>()))?;
        debug!(query = route.name, "dispatch");

        let dto = (route.call)(Box::new(q), ctx).await?;
        dto.downcast::<Q::Dto>()
            .map(|dto| *dto)
            .map_err(|_| AppError::TypeMismatch {
                expected: type_name::<Q::Dto>(),
                found: "unknown",
            })
    }
}
