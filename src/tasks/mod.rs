//! 后台定时任务
//!
//! 启动时调用一次 `spawn_all`，任务通过 `tokio::spawn` 挂到运行时上，不阻塞调用方。

use crate::config::TaskConfig;
use crate::services::CampaignService;
use std::time::Duration;

pub fn spawn_all(campaign_service: CampaignService, config: &TaskConfig) {
    // 募捐统计对账：按捐款记录重建所有活动的统计行
    if config.reconcile_interval_secs == 0 {
        log::info!("Campaign statistics reconciliation is disabled");
    } else {
        let interval = Duration::from_secs(config.reconcile_interval_secs);
        let svc = campaign_service.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                match svc.reconcile_all().await {
                    Ok(report) if report.campaigns > 0 => {
                        log::info!("Campaign statistics reconciled: {}", report.campaigns)
                    }
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to reconcile campaign statistics: {e:?}"),
                }
            }
        });
    }
}
