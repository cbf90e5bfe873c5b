//! Host-side reception of bound cuts.

use super::BoundCut;
use crate::error::{FbbtError, FbbtResult};

/// Receives bound cuts from the evaluator.
///
/// Cuts are advisory: the host may discard any of them later. Returning an
/// error rejects that one cut only.
pub trait CutSink {
    /// Offer one cut to the host.
    fn add_bound_cut(&mut self, cut: BoundCut) -> FbbtResult<()>;
}

impl<S: CutSink + ?Sized> CutSink for &mut S {
    fn add_bound_cut(&mut self, cut: BoundCut) -> FbbtResult<()> {
        (**self).add_bound_cut(cut)
    }
}

/// Vec-backed cut sink with an optional capacity.
#[derive(Debug, Clone, Default)]
pub struct CutCollector {
    cuts: Vec<BoundCut>,
    max_cuts: Option<usize>,
}

impl CutCollector {
    /// Unlimited collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collector that rejects cuts once `max_cuts` are stored.
    pub fn with_capacity_limit(max_cuts: usize) -> Self {
        Self {
            cuts: Vec::new(),
            max_cuts: Some(max_cuts),
        }
    }

    /// Collected cuts in emission order.
    pub fn cuts(&self) -> &[BoundCut] {
        &self.cuts
    }

    /// Take the collected cuts, leaving the collector empty.
    pub fn drain(&mut self) -> Vec<BoundCut> {
        std::mem::take(&mut self.cuts)
    }

    /// Number of collected cuts.
    pub fn len(&self) -> usize {
        self.cuts.len()
    }

    /// Returns true if no cut was collected.
    pub fn is_empty(&self) -> bool {
        self.cuts.is_empty()
    }
}

impl CutSink for CutCollector {
    fn add_bound_cut(&mut self, cut: BoundCut) -> FbbtResult<()> {
        if let Some(max) = self.max_cuts {
            if self.cuts.len() >= max {
                return Err(FbbtError::CutRejected(format!(
                    "cut pool full ({} cuts), dropping {}",
                    max, cut
                )));
            }
        }
        self.cuts.push(cut);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_limit() {
        let mut sink = CutCollector::with_capacity_limit(1);
        sink.add_bound_cut(BoundCut::lower(0, 1.0)).unwrap();
        let err = sink.add_bound_cut(BoundCut::upper(0, 2.0)).unwrap_err();
        assert!(matches!(err, FbbtError::CutRejected(_)));
        assert_eq!(sink.len(), 1);

        let drained = sink.drain();
        assert_eq!(drained, vec![BoundCut::lower(0, 1.0)]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_sink_by_reference() {
        fn offer(mut sink: impl CutSink) {
            sink.add_bound_cut(BoundCut::upper(2, 5.0)).unwrap();
        }
        let mut collector = CutCollector::new();
        offer(&mut collector);
        assert_eq!(collector.cuts(), &[BoundCut::upper(2, 5.0)]);
    }
}
