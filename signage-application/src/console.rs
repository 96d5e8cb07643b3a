//! 后台控制台组合根（AdminConsole）
//!
//! 显式创建事件总线并注入所有生产者与消费者：
//! 领域服务、命令/查询总线以及按需挂载的镜像都共享同一个总线实例。
//!
use crate::command::Command;
use crate::command_bus::CommandBus;
use crate::commands::{CreateEntity, DeleteEntity, EntityCommandHandler, UpdateEntity};
use crate::config::ConsoleConfig;
use crate::context::AppContext;
use crate::error::AppError;
use crate::inmemory_command_bus::InMemoryCommandBus;
use crate::inmemory_query_bus::InMemoryQueryBus;
use crate::queries::{
    ActivityQueryHandler, EntityQueryHandler, FindEntity, ListEntities, RecentActivity,
};
use crate::query::Query;
use crate::query_bus::QueryBus;
use bon::bon;
use serde::Serialize;
use signage_domain::entity::Entity;
use signage_domain::eventing::{EventBus, InMemoryEventBus};
use signage_domain::mirror::{ActivityFeed, MirrorConsumer};
use signage_domain::model::{BillingRecord, Organization, Persist, SubscriptionPlan, UserProfile};
use signage_domain::remote::RemoteTable;
use signage_domain::service::{ActivityLogger, EntityService, ReferenceGuard};
use std::sync::Arc;
use tracing::info;

pub struct AdminConsole {
    config: ConsoleConfig,
    bus: Arc<dyn EventBus>,
    plans: EntityService<SubscriptionPlan>,
    organizations: EntityService<Organization>,
    users: EntityService<UserProfile>,
    billing: EntityService<BillingRecord>,
    activity: ActivityLogger,
    commands: InMemoryCommandBus,
    queries: InMemoryQueryBus,
}

fn register_entity<E>(
    commands: &InMemoryCommandBus,
    queries: &InMemoryQueryBus,
    service: &EntityService<E>,
    audit: &Option<ActivityLogger>,
) -> Result<(), AppError>
where
    E: Persist + Serialize,
{
    let writer = Arc::new(EntityCommandHandler::new(service.clone(), audit.clone()));
    commands.register::<CreateEntity<E>, _>(writer.clone())?;
    commands.register::<UpdateEntity<E>, _>(writer.clone())?;
    commands.register::<DeleteEntity<E>, _>(writer)?;

    let reader = Arc::new(EntityQueryHandler::new(service.clone()));
    queries.register::<ListEntities<E>, _>(reader.clone())?;
    queries.register::<FindEntity<E>, _>(reader)?;
    Ok(())
}

#[bon]
impl AdminConsole {
    #[builder]
    pub fn new(
        remote: Arc<dyn RemoteTable>,
        #[builder(default)] config: ConsoleConfig,
        bus: Option<Arc<dyn EventBus>>,
    ) -> Result<Self, AppError> {
        config.validate()?;
        let bus = bus.unwrap_or_else(|| Arc::new(InMemoryEventBus::new()) as Arc<dyn EventBus>);

        let mut plans = EntityService::new(remote.clone(), bus.clone());
        if config.protect_referenced_plans {
            plans = plans.with_guard(Arc::new(ReferenceGuard::new(
                remote.clone(),
                Organization::TABLE,
                "subscription_plan_id",
            )));
        }
        let organizations = EntityService::new(remote.clone(), bus.clone());
        let users = EntityService::new(remote.clone(), bus.clone());
        let billing = EntityService::new(remote.clone(), bus.clone());
        let activity = ActivityLogger::new(remote, bus.clone());

        let audit = config.audit_mutations.then(|| activity.clone());
        let commands = InMemoryCommandBus::new();
        let queries = InMemoryQueryBus::new();
        register_entity(&commands, &queries, &plans, &audit)?;
        register_entity(&commands, &queries, &organizations, &audit)?;
        register_entity(&commands, &queries, &users, &audit)?;
        register_entity(&commands, &queries, &billing, &audit)?;
        queries.register::<RecentActivity, _>(Arc::new(ActivityQueryHandler::new(
            activity.clone(),
        )))?;

        info!(
            commands = commands.registered_commands().len(),
            queries = queries.registered_queries().len(),
            audit = config.audit_mutations,
            "admin console ready"
        );

        Ok(Self {
            config,
            bus,
            plans,
            organizations,
            users,
            billing,
            activity,
            commands,
            queries,
        })
    }
}

impl AdminConsole {
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn bus(&self) -> &Arc<dyn EventBus> {
        &self.bus
    }

    pub fn plans(&self) -> &EntityService<SubscriptionPlan> {
        &self.plans
    }

    pub fn organizations(&self) -> &EntityService<Organization> {
        &self.organizations
    }

    pub fn users(&self) -> &EntityService<UserProfile> {
        &self.users
    }

    pub fn billing(&self) -> &EntityService<BillingRecord> {
        &self.billing
    }

    pub fn activity(&self) -> &ActivityLogger {
        &self.activity
    }

    /// 执行写命令
    pub async fn execute<C: Command>(&self, ctx: &AppContext, cmd: C) -> Result<C::Output, AppError> {
        self.commands.dispatch(ctx, cmd).await
    }

    /// 执行只读查询
    pub async fn query<Q: Query>(&self, ctx: &AppContext, q: Q) -> Result<Q::Dto, AppError> {
        self.queries.dispatch(ctx, q).await
    }

    /// 通知所有套餐镜像刷新
    pub fn invalidate_plans(&self) -> bool {
        self.plans.invalidate()
    }

    async fn mount<E: Persist>(
        &self,
        name: &str,
        service: &EntityService<E>,
    ) -> MirrorConsumer<E> {
        let mut mirror = MirrorConsumer::new(name, self.bus.clone());
        mirror.mount(service).await;
        mirror
    }

    pub async fn mount_plans(&self, name: &str) -> MirrorConsumer<SubscriptionPlan> {
        self.mount(name, &self.plans).await
    }

    pub async fn mount_organizations(&self, name: &str) -> MirrorConsumer<Organization> {
        self.mount(name, &self.organizations).await
    }

    pub async fn mount_users(&self, name: &str) -> MirrorConsumer<UserProfile> {
        self.mount(name, &self.users).await
    }

    pub async fn mount_billing(&self, name: &str) -> MirrorConsumer<BillingRecord> {
        self.mount(name, &self.billing).await
    }

    pub async fn mount_activity_feed(&self) -> ActivityFeed {
        let mut feed = ActivityFeed::new(self.bus.clone(), self.config.activity_feed_limit);
        feed.mount(&self.activity).await;
        feed
    }
}
