use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chess_core::Board;
use crossbeam_channel::{bounded, Receiver, Sender};

use crate::config::MctsConfig;
use crate::error::EvaluatorError;
use crate::evaluation::{Evaluator, Prediction};

/// A batched wrapper around an evaluator.
///
/// Calls to `predict` enqueue the features and block until the background
/// worker flushes a batch through `predict_batch` and returns the matching
/// prediction. Clones share the same worker, so parallel games can feed one
/// batch.
pub struct BatchingEvaluator<E: Evaluator + Send + Sync + 'static> {
    inner: Arc<BatchingInner<E>>,
}

struct BatchWork {
    features: Vec<f32>,
    resp_tx: Sender<Result<Prediction, EvaluatorError>>,
}

struct BatchingInner<E: Evaluator + Send + Sync + 'static> {
    sender: Sender<BatchWork>,
    _handle: thread::JoinHandle<()>,
    evaluator: Arc<E>,
}

impl<E: Evaluator + Send + Sync + 'static> BatchingEvaluator<E> {
    /// Create a new batching wrapper.
    ///
    /// - `evaluator`: the underlying evaluator, shared with the worker thread
    /// - `batch_size`: maximum items per batch (>=1)
    /// - `timeout`: maximum time to wait before flushing a partial batch
    pub fn new(evaluator: E, batch_size: usize, timeout: Duration) -> Self {
        let batch_size = batch_size.max(1);
        let (tx, rx) = bounded::<BatchWork>(batch_size * 4);

        let evaluator = Arc::new(evaluator);
        let worker_evaluator = Arc::clone(&evaluator);
        let handle = thread::spawn(move || worker_loop(worker_evaluator, batch_size, timeout, rx));

        Self {
            inner: Arc::new(BatchingInner {
                sender: tx,
                _handle: handle,
                evaluator,
            }),
        }
    }

    /// Batch size and flush timeout taken from `config`
    pub fn from_config(evaluator: E, config: &MctsConfig) -> Self {
        Self::new(
            evaluator,
            config.batch_size as usize,
            Duration::from_millis(config.batch_timeout_ms),
        )
    }
}

impl<E: Evaluator + Send + Sync + 'static> Clone for BatchingEvaluator<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Evaluator + Send + Sync + 'static> Evaluator for BatchingEvaluator<E> {
    fn encode(&self, board: &Board) -> Vec<f32> {
        self.inner.evaluator.encode(board)
    }

    fn predict(&self, features: &[f32]) -> Result<Prediction, EvaluatorError> {
        let (resp_tx, resp_rx) = bounded::<Result<Prediction, EvaluatorError>>(1);

        // Enqueue the work. If the worker has stopped, surface an error.
        self.inner
            .sender
            .send(BatchWork {
                features: features.to_vec(),
                resp_tx,
            })
            .map_err(|_| EvaluatorError::WorkerStopped)?;

        // Block until the worker returns the matching prediction.
        resp_rx.recv().map_err(|_| EvaluatorError::WorkerStopped)?
    }
}

fn worker_loop<E: Evaluator + Send + Sync + 'static>(
    evaluator: Arc<E>,
    batch_size: usize,
    timeout: Duration,
    rx: Receiver<BatchWork>,
) {
    // Loop until all senders are dropped.
    while let Ok(first) = rx.recv() {
        let mut batch = Vec::with_capacity(batch_size);
        let mut responders = Vec::with_capacity(batch_size);

        batch.push(first.features);
        responders.push(first.resp_tx);

        // Fill up to batch_size or until timeout expires.
        let deadline = Instant::now() + timeout;
        while responders.len() < batch_size {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match rx.recv_timeout(remaining) {
                Ok(work) => {
                    batch.push(work.features);
                    responders.push(work.resp_tx);
                }
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => break,
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
            }
        }

        match evaluator.predict_batch(&batch) {
            Ok(predictions) if predictions.len() == responders.len() => {
                for (tx, prediction) in responders.into_iter().zip(predictions) {
                    let _ = tx.send(Ok(prediction));
                }
            }
            Ok(predictions) => {
                let msg = format!(
                    "batch of {} produced {} predictions",
                    responders.len(),
                    predictions.len()
                );
                for tx in responders {
                    let _ = tx.send(Err(EvaluatorError::Failed(msg.clone())));
                }
            }
            Err(err) => {
                for tx in responders {
                    let _ = tx.send(Err(err.clone()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::POLICY_SIZE;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEvaluator {
        batches: AtomicUsize,
        largest: AtomicUsize,
    }

    impl CountingEvaluator {
        fn new() -> Self {
            Self {
                batches: AtomicUsize::new(0),
                largest: AtomicUsize::new(0),
            }
        }
    }

    impl Evaluator for CountingEvaluator {
        fn predict(&self, features: &[f32]) -> Result<Prediction, EvaluatorError> {
            Ok(Prediction {
                policy: vec![0.0; POLICY_SIZE],
                value: features.first().copied().unwrap_or(0.0) as f64,
            })
        }

        fn predict_batch(&self, batch: &[Vec<f32>]) -> Result<Vec<Prediction>, EvaluatorError> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            self.largest.fetch_max(batch.len(), Ordering::SeqCst);
            batch.iter().map(|f| self.predict(f)).collect()
        }
    }

    struct FailingEvaluator;

    impl Evaluator for FailingEvaluator {
        fn predict(&self, _features: &[f32]) -> Result<Prediction, EvaluatorError> {
            Err(EvaluatorError::Failed("model offline".into()))
        }
    }

    #[test]
    fn batches_concurrent_requests() {
        let batching =
            BatchingEvaluator::new(CountingEvaluator::new(), 8, Duration::from_millis(50));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let batching = batching.clone();
                std::thread::spawn(move || batching.predict(&[i as f32 / 10.0]))
            })
            .collect();

        for (i, h) in handles.into_iter().enumerate() {
            let prediction = h.join().unwrap().unwrap();
            assert_eq!(prediction.policy.len(), POLICY_SIZE);
            // Each caller gets its own row back
            assert!((prediction.value - i as f64 / 10.0).abs() < 1e-6);
        }

        let inner = &batching.inner.evaluator;
        assert!(inner.batches.load(Ordering::SeqCst) <= 4);
        assert!(inner.largest.load(Ordering::SeqCst) <= 8);
    }

    #[test]
    fn errors_reach_every_caller() {
        let batching = BatchingEvaluator::new(FailingEvaluator, 2, Duration::from_millis(1));
        let result = batching.predict(&[0.0]);
        assert_eq!(result, Err(EvaluatorError::Failed("model offline".into())));
    }

    #[test]
    fn batch_limits_come_from_config() {
        let config = MctsConfig::default().with_batch_size(2).with_batch_timeout_ms(1);
        let batching = BatchingEvaluator::from_config(CountingEvaluator::new(), &config);

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let batching = batching.clone();
                std::thread::spawn(move || batching.predict(&[0.5]))
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap().is_ok());
        }
        assert!(batching.inner.evaluator.largest.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn encode_uses_wrapped_evaluator() {
        let batching =
            BatchingEvaluator::new(CountingEvaluator::new(), 1, Duration::from_millis(1));
        assert_eq!(batching.encode(&Board::new()), Board::new().encode());
    }
}
