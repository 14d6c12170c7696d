use blocks::Millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
}

/// A due firing of one of the scheduler's two periodic tasks, stamped with the
/// instant it was scheduled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Block-step tick: advance every active sprite by one block.
    Tick(Millis),
    /// Redraw frame: expire bubbles, detect completion.
    Frame(Millis),
}

impl Activation {
    pub fn at(&self) -> Millis {
        match self {
            Activation::Tick(at) | Activation::Frame(at) => *at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PeriodicTask {
    interval: Millis,
    next_due: Millis,
}

impl PeriodicTask {
    fn starting_at(now: Millis, interval: Millis) -> Self {
        let interval = interval.max(1);
        PeriodicTask {
            interval,
            next_due: now.saturating_add(interval),
        }
    }

    fn due_by(&self, until: Millis) -> Option<Millis> {
        (self.next_due <= until).then_some(self.next_due)
    }

    fn fire(&mut self) -> Millis {
        let at = self.next_due;
        self.next_due = at.saturating_add(self.interval);
        at
    }
}

/// Idle/Running state machine owning the tick task and the frame task.
///
/// Both tasks exist only while running and are dropped together on stop.
/// [`Scheduler::next_activation`] consults the run state before every
/// firing, so nothing fires after `stop`, even an activation that was
/// already due.
#[derive(Debug, Clone)]
pub struct Scheduler {
    state: RunState,
    tick_interval: Millis,
    frame_interval: Millis,
    tick: Option<PeriodicTask>,
    frame: Option<PeriodicTask>,
}

impl Scheduler {
    pub fn new(tick_interval: Millis, frame_interval: Millis) -> Self {
        Scheduler {
            state: RunState::Idle,
            tick_interval,
            frame_interval,
            tick: None,
            frame: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Enter `Running` and arm both tasks relative to `now`. Returns false,
    /// changing nothing, if already running.
    pub fn start(&mut self, now: Millis) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = RunState::Running;
        self.tick = Some(PeriodicTask::starting_at(now, self.tick_interval));
        self.frame = Some(PeriodicTask::starting_at(now, self.frame_interval));
        true
    }

    /// Cancel both tasks and go idle. Returns false if already idle.
    pub fn stop(&mut self) -> bool {
        let was_running = self.is_running();
        self.state = RunState::Idle;
        self.tick = None;
        self.frame = None;
        was_running
    }

    /// Pop the earliest activation due at or before `until`, rearming its task.
    /// A tick wins a tie with a frame.
    pub fn next_activation(&mut self, until: Millis) -> Option<Activation> {
        if !self.is_running() {
            return None;
        }
        let tick_due = self.tick.as_ref().and_then(|t| t.due_by(until));
        let frame_due = self.frame.as_ref().and_then(|f| f.due_by(until));

        match (tick_due, frame_due) {
            (Some(t), Some(f)) if f < t => self.frame.as_mut().map(|f| Activation::Frame(f.fire())),
            (Some(_), _) => self.tick.as_mut().map(|t| Activation::Tick(t.fire())),
            (None, Some(_)) => self.frame.as_mut().map(|f| Activation::Frame(f.fire())),
            (None, None) => None,
        }
    }
}
