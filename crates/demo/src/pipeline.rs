//! Producer/consumer scalar product over a [`BoundedBuffer`].
//!
//! The producer multiplies the vectors element-wise and `put`s each product;
//! the consumer sums whatever `get` returns until end of stream.

use std::thread;
use std::time::Instant;

use anyhow::{Context, anyhow};
use lockstep_buffer::{BoundedBuffer, Delivery};
use lockstep_core::DomainError;
use rand::Rng;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::report::{PipelineReport, PipelineRun};
use crate::rng::thread_rng_for;

pub fn random_vector<R: Rng>(len: usize, min: i64, max: i64, rng: &mut R) -> Vec<i64> {
    (0..len).map(|_| rng.gen_range(min..=max)).collect()
}

/// Direct (single-threaded) scalar product, used as the reference result.
pub fn dot(a: &[i64], b: &[i64]) -> i64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Scalar product computed by one producer and one consumer thread through a
/// buffer of `capacity` items.
pub fn scalar_product(a: &[i64], b: &[i64], capacity: usize) -> anyhow::Result<i64> {
    handoff(a, b, capacity, false)
}

/// Small fixed example that logs every handoff, for watching the buffer
/// block and wake.
pub fn walkthrough(capacity: usize) -> anyhow::Result<PipelineRun> {
    let a = [1, 2, 3, 4, 5];
    let b = [6, 7, 8, 9, 10];
    let expected = dot(&a, &b);
    info!(?a, ?b, expected, capacity, "walkthrough starting");

    let started = Instant::now();
    let result = handoff(&a, &b, capacity, true)?;

    Ok(PipelineRun {
        capacity,
        result,
        correct: result == expected,
        elapsed_secs: started.elapsed().as_secs_f64(),
    })
}

/// Run the scalar product once per configured capacity on the same vectors.
pub fn run_pipeline(config: &PipelineConfig) -> anyhow::Result<PipelineReport> {
    config.validate()?;

    let a = random_vector(
        config.vector_len,
        config.min_value,
        config.max_value,
        &mut thread_rng_for(config.seed, 0),
    );
    let b = random_vector(
        config.vector_len,
        config.min_value,
        config.max_value,
        &mut thread_rng_for(config.seed, 1),
    );
    let expected = dot(&a, &b);
    info!(vector_len = config.vector_len, expected, "vectors generated");

    let mut runs = Vec::with_capacity(config.capacities.len());
    for &capacity in &config.capacities {
        let started = Instant::now();
        let result = scalar_product(&a, &b, capacity)
            .with_context(|| format!("pipeline run with capacity {capacity} failed"))?;
        let elapsed = started.elapsed();

        let correct = result == expected;
        info!(
            capacity,
            result,
            correct,
            elapsed_ms = elapsed.as_millis() as u64,
            "pipeline run finished"
        );
        runs.push(PipelineRun {
            capacity,
            result,
            correct,
            elapsed_secs: elapsed.as_secs_f64(),
        });
    }

    Ok(PipelineReport {
        vector_len: config.vector_len,
        expected,
        runs,
    })
}

fn handoff(a: &[i64], b: &[i64], capacity: usize, verbose: bool) -> anyhow::Result<i64> {
    if a.len() != b.len() {
        return Err(DomainError::validation(format!(
            "vector lengths differ: {} vs {}",
            a.len(),
            b.len()
        ))
        .into());
    }
    let buffer = BoundedBuffer::new(capacity)?;

    thread::scope(|scope| -> anyhow::Result<i64> {
        let consumer = thread::Builder::new()
            .name("consumer".to_string())
            .spawn_scoped(scope, || consume(&buffer, verbose))
            .context("failed to spawn consumer")?;

        let producer = match thread::Builder::new()
            .name("producer".to_string())
            .spawn_scoped(scope, || produce(&buffer, a, b, verbose))
        {
            Ok(handle) => handle,
            Err(err) => {
                // Release the consumer before the scope joins it.
                buffer.close();
                return Err(anyhow::Error::new(err).context("failed to spawn producer"));
            }
        };

        producer
            .join()
            .map_err(|_| anyhow!("producer thread panicked"))?;
        consumer
            .join()
            .map_err(|_| anyhow!("consumer thread panicked"))
    })
}

/// Closes the buffer when the producer returns or unwinds, so the consumer
/// always reaches end of stream.
struct CloseOnDrop<'a>(&'a BoundedBuffer<i64>);

impl Drop for CloseOnDrop<'_> {
    fn drop(&mut self) {
        self.0.close();
    }
}

fn produce(buffer: &BoundedBuffer<i64>, a: &[i64], b: &[i64], verbose: bool) {
    let _close = CloseOnDrop(buffer);

    for (x, y) in a.iter().zip(b) {
        let product = x * y;
        if verbose {
            info!(x, y, product, "producer: put");
        }
        if buffer.put(product) == Delivery::Discarded {
            warn!("buffer closed under the producer; stopping early");
            break;
        }
    }
    if verbose {
        info!("producer: done");
    }
}

fn consume(buffer: &BoundedBuffer<i64>, verbose: bool) -> i64 {
    let mut total = 0;
    for product in buffer {
        total += product;
        if verbose {
            info!(product, total, "consumer: got");
        }
    }
    if verbose {
        info!(total, "consumer: end of stream");
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walkthrough_matches_hand_computed_result() {
        let run = walkthrough(2).unwrap();
        assert_eq!(run.result, 130);
        assert!(run.correct);
    }

    #[test]
    fn mismatched_vectors_are_rejected() {
        let err = scalar_product(&[1, 2], &[3], 4).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::Validation(_))
        ));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(scalar_product(&[1], &[1], 0).is_err());
    }

    #[test]
    fn empty_vectors_produce_zero() {
        assert_eq!(scalar_product(&[], &[], 3).unwrap(), 0);
    }

    #[test]
    fn seeded_pipeline_is_correct_for_every_capacity() {
        let config = PipelineConfig::default()
            .with_vector_len(2_000)
            .with_capacities(vec![1, 7, 64, 5_000])
            .with_seed(9);
        let report = run_pipeline(&config).unwrap();

        assert_eq!(report.runs.len(), 4);
        assert!(report.all_correct());
        assert!(report.runs.iter().all(|run| run.result == report.expected));
    }
}
