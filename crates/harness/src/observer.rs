use std::cell::RefCell;
use std::rc::Rc;

use slidedeck_engine::{HistoryFlags, HistoryObserver, ResolvedFocus};

#[derive(Debug, Default)]
pub struct ObserverLog {
    pub flags: Vec<HistoryFlags>,
    pub focus: Vec<ResolvedFocus>,
}

impl ObserverLog {
    pub fn last_flags(&self) -> Option<HistoryFlags> {
        self.flags.last().copied()
    }
}

/// Observer that appends every notification to a shared log the test keeps a
/// handle on.
pub struct RecordingObserver {
    log: Rc<RefCell<ObserverLog>>,
}

impl RecordingObserver {
    pub fn new() -> (Self, Rc<RefCell<ObserverLog>>) {
        let log = Rc::new(RefCell::new(ObserverLog::default()));
        (Self { log: Rc::clone(&log) }, log)
    }
}

impl HistoryObserver for RecordingObserver {
    fn history_changed(&mut self, flags: HistoryFlags) {
        self.log.borrow_mut().flags.push(flags);
    }

    fn focus_changed(&mut self, focus: &ResolvedFocus) {
        self.log.borrow_mut().focus.push(focus.clone());
    }
}
