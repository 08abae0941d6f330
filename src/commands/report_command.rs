//! commands/report_command.rs
//! Subcomando `report`: muestra el reporte agregado y opcionalmente lo guarda.

use anyhow::Result;

use crate::services::report_service::ReportService;
use crate::services::stats_service::StatsService;

pub async fn run(stats: StatsService, save: bool) -> Result<()> {
    let report_service = ReportService::new(stats);

    let report = report_service.generate_report().await?;
    report_service.display_report(&report);

    if save {
        report_service.save_report(&report)?;
    }

    Ok(())
}
