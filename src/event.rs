use uuid::Uuid;

use crate::controller::RunOutcome;
use crate::render::{ChartSpec, ResultsTable};
use crate::sink::ChartTarget;

#[derive(Debug, Clone)]
pub enum AppEvent {
    Status {
        run_id: Uuid,
        text: String,
    },
    ChartDrawn {
        run_id: Uuid,
        target: ChartTarget,
        chart: ChartSpec,
    },
    TableReplaced {
        run_id: Uuid,
        table: ResultsTable,
    },
    RunFinished {
        run_id: Uuid,
        outcome: RunOutcome,
    },
    RunErrored {
        run_id: Uuid,
        message: String,
    },
    LogMessage(String),
}
