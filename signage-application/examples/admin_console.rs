/// 后台控制台示例
/// 从环境变量读取配置，组装 AdminConsole，挂载几个视图并执行一组写命令
use anyhow::Result as AnyResult;
use serde_json::json;
use signage_application::AdminConsole;
use signage_application::commands::{CreateEntity, DeleteEntity, UpdateEntity};
use signage_application::config::ConsoleConfig;
use signage_application::context::AppContext;
use signage_application::logging::init_logging;
use signage_application::queries::RecentActivity;
use signage_domain::entity::Entity;
use signage_domain::model::{
    Organization, OrganizationDraft, OrganizationPatch, OrganizationStatus, SubscriptionPlan,
    UserDraft, UserProfile, UserRole,
};
use signage_domain::remote::InMemoryBackend;
use std::sync::Arc;

#[tokio::main]
async fn main() -> AnyResult<()> {
    let config = ConsoleConfig::from_env()?;
    init_logging(&config.log_filter);

    let backend = Arc::new(InMemoryBackend::new());
    backend.seed(
        SubscriptionPlan::TABLE,
        [
            json!({"id": "1", "name": "Free", "price": 0, "max_screens": 1}),
            json!({"id": "2", "name": "Standard", "price": "29.99", "max_screens": 10}),
        ],
    );

    let console = AdminConsole::builder()
        .remote(backend.clone())
        .config(config)
        .build()?;
    let ctx = AppContext::for_actor("super-admin");

    let organizations = console.mount_organizations("organizations-page").await;
    let users = console.mount_users("users-page").await;
    let feed = console.mount_activity_feed().await;

    let org = console
        .execute(
            &ctx,
            CreateEntity::<Organization>::new(
                OrganizationDraft::builder()
                    .name("Harbor Cafe")
                    .slug("harbor-cafe")
                    .subscription_plan_id("2")
                    .status(OrganizationStatus::Trial)
                    .build(),
            ),
        )
        .await?;
    console
        .execute(
            &ctx,
            CreateEntity::<UserProfile>::new(
                UserDraft::builder()
                    .email("owner@harbor.example")
                    .full_name("Harbor Owner")
                    .organization_id(org.id.clone())
                    .role(UserRole::Admin)
                    .build(),
            ),
        )
        .await?;
    console
        .execute(
            &ctx,
            UpdateEntity::<Organization>::new(
                org.id.clone(),
                OrganizationPatch::builder()
                    .status(OrganizationStatus::Active)
                    .build(),
            ),
        )
        .await?;

    if let Err(err) = console
        .execute(&ctx, DeleteEntity::<SubscriptionPlan>::new("2"))
        .await
    {
        println!("plan delete refused: {err}");
    }

    for org in organizations.items() {
        println!("org  {} {:?} plan={:?}", org.name, org.status, org.subscription_plan_id);
    }
    for user in users.items() {
        println!("user {} {:?}", user.email, user.role);
    }
    for entry in feed.entries() {
        println!("log  {} {} {:?}", entry.action, entry.entity_type, entry.entity_id);
    }

    let recent = console.query(&ctx, RecentActivity { limit: 5 }).await?;
    println!("{} recent activities", recent.len());
    Ok(())
}
