/// 套餐镜像示例
/// 展示 服务写入 -> 事件总线 -> 两个独立镜像 的对账过程，以及失败写入不会产生事件
use anyhow::Result as AnyResult;
use serde_json::json;
use signage_domain::domain_event::Event;
use signage_domain::entity::Entity;
use signage_domain::eventing::{EventBus, FnHandler, HandledEventType, InMemoryEventBus};
use signage_domain::mirror::MirrorConsumer;
use signage_domain::model::{Organization, PlanDraft, PlanPatch, SubscriptionPlan};
use signage_domain::remote::{InMemoryBackend, Operation, RemoteError};
use signage_domain::service::{EntityService, ReferenceGuard};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn print_mirror(label: &str, mirror: &MirrorConsumer<SubscriptionPlan>) {
    println!("[{label}] rev={} state={}", mirror.revision(), mirror.state());
    for plan in mirror.items() {
        println!("  {:>4} {:<16} {:>8}", plan.id, plan.name, plan.price);
    }
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let backend = Arc::new(InMemoryBackend::new());
    backend.seed(
        SubscriptionPlan::TABLE,
        [
            json!({"id": "1", "name": "Free", "price": 0, "max_screens": 1}),
            json!({"id": "2", "name": "Standard", "price": "29.99", "max_screens": "10"}),
            json!({"id": "3", "name": "Pro", "price": 99, "features": "[\"Analytics\"]"}),
        ],
    );
    backend.seed(
        Organization::TABLE,
        [json!({"id": "o-1", "name": "Acme Retail", "subscription_plan_id": "3"})],
    );

    let bus = Arc::new(InMemoryEventBus::new());
    let _audit = bus.subscribe(Arc::new(FnHandler::new(
        "console-log",
        HandledEventType::All,
        |ev: &Event| {
            println!("event: {}", serde_json::to_string(ev)?);
            Ok(())
        },
    )));

    let plans: EntityService<SubscriptionPlan> = EntityService::new(backend.clone(), bus.clone())
        .with_guard(Arc::new(ReferenceGuard::new(
            backend.clone(),
            Organization::TABLE,
            "subscription_plan_id",
        )));

    let mut pricing_page = MirrorConsumer::new("pricing-page", bus.clone());
    let mut plan_table = MirrorConsumer::new("plan-table", bus.clone());
    pricing_page.mount(&plans).await;
    plan_table.mount(&plans).await;

    plans
        .create(
            PlanDraft::builder()
                .name("Enterprise")
                .price(299.0)
                .max_screens(500)
                .is_popular(true)
                .build(),
        )
        .await?;
    plans
        .update(
            &"2".to_string(),
            PlanPatch::builder().name("Standard Plus").price(39.99).build(),
        )
        .await?;

    if let Err(err) = plans.delete(&"3".to_string()).await {
        println!("delete refused: {err}");
    }

    backend.fail_next(
        SubscriptionPlan::TABLE,
        Operation::Delete,
        RemoteError::new("connection reset"),
    );
    if let Err(err) = plans.delete(&"1".to_string()).await {
        println!("delete failed: {err}");
    }

    print_mirror("pricing-page", &pricing_page);

    plan_table.unmount();
    plans.delete(&"1".to_string()).await?;

    print_mirror("pricing-page", &pricing_page);
    print_mirror("plan-table", &plan_table);
    Ok(())
}
