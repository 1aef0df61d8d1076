use super::Strategy;
use crate::error::{Result, ScanError};
use crate::navigation::Request;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Pending requests shared by all crawl workers.
///
/// Requests are always pushed to the back. Breadth-first pops from the front,
/// depth-first pops from the back.
pub struct Frontier {
    strategy: Strategy,
    pending: Mutex<VecDeque<Request>>,
}

impl Frontier {
    pub fn new(strategy: Strategy) -> Result<Self> {
        if strategy == Strategy::Unknown {
            return Err(ScanError::InvalidStrategy(
                "frontier needs breadth-first or depth-first".to_string(),
            ));
        }
        Ok(Self {
            strategy,
            pending: Mutex::new(VecDeque::new()),
        })
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn push(&self, request: Request) {
        self.pending.lock().push_back(request);
    }

    pub fn pop(&self) -> Option<Request> {
        let mut pending = self.pending.lock();
        match self.strategy {
            Strategy::DepthFirst => pending.pop_back(),
            _ => pending.pop_front(),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}
