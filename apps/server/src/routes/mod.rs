use actix_web::web::ServiceConfig;

pub mod health;
pub mod records;
pub mod targets;
pub mod tasks;

pub fn routes(cfg: &mut ServiceConfig) {
    cfg.service(health::health_route)
        .service(tasks::list_tasks)
        .service(tasks::trigger_run)
        .service(tasks::get_task)
        .service(records::list_records)
        .service(records::delete_records)
        .service(records::records_for_ip)
        .service(targets::list_targets)
        .service(targets::create_target);
}
