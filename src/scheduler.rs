/// One render walk's identity and cancellation flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderJob {
    pub id: u64,
    pub canceled: bool,
}

/// Single-flight render scheduling with supersession.
///
/// At most one job is active. Requests made while it runs cancel it and owe
/// exactly one follow-up, started when the active job completes.
#[derive(Debug)]
pub struct RenderScheduler {
    active: Option<RenderJob>,
    follow_up: bool,
    next_id: u64,
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self {
            active: None,
            follow_up: false,
            next_id: 1,
        }
    }
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn start(&mut self) -> RenderJob {
        let job = RenderJob {
            id: self.next_id,
            canceled: false,
        };
        self.next_id += 1;
        self.active = Some(job);
        tracing::trace!(job = job.id, "render job started");
        job
    }

    /// Start a job when idle; otherwise cancel the active one and owe a follow-up.
    pub fn request_render(&mut self) -> Option<RenderJob> {
        match self.active.as_mut() {
            None => Some(self.start()),
            Some(active) => {
                if !active.canceled {
                    tracing::trace!(job = active.id, "render job superseded");
                }
                active.canceled = true;
                self.follow_up = true;
                None
            }
        }
    }

    /// Retire job `id`. Returns the follow-up job if one was owed.
    pub fn complete(&mut self, id: u64) -> Option<RenderJob> {
        match self.active {
            Some(active) if active.id == id => {
                self.active = None;
                if std::mem::take(&mut self.follow_up) {
                    Some(self.start())
                } else {
                    None
                }
            }
            _ => {
                tracing::debug!(job = id, "completion for a job that is not active");
                None
            }
        }
    }

    pub fn active(&self) -> Option<&RenderJob> {
        self.active.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Id of the most recently started job, 0 before the first.
    pub fn last_id(&self) -> u64 {
        self.next_id - 1
    }
}
