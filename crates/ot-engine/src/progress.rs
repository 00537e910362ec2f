use ot_network::SimulationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Validating,
    Compiling,
    SolvingSteady,
    RunningTransient,
    CheckingEnergy,
    Completed,
    Failed,
}

impl RunStage {
    pub fn label(self) -> &'static str {
        match self {
            RunStage::Validating => "validating",
            RunStage::Compiling => "compiling",
            RunStage::SolvingSteady => "solving steady state",
            RunStage::RunningTransient => "running transient",
            RunStage::CheckingEnergy => "checking energy balance",
            RunStage::Completed => "completed",
            RunStage::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransientProgress {
    pub sim_time_s: f64,
    pub t_end_s: f64,
    pub fraction_complete: f64,
    pub accepted_steps: usize,
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub kind: SimulationKind,
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub transient: Option<TransientProgress>,
}

impl RunProgressEvent {
    pub fn stage(
        kind: SimulationKind,
        stage: RunStage,
        elapsed_wall_s: f64,
        message: Option<String>,
    ) -> Self {
        Self {
            kind,
            stage,
            elapsed_wall_s,
            message,
            transient: None,
        }
    }
}
