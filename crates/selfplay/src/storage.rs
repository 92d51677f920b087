use anyhow::Result;
use ndarray::{Array, Array1, Array2, Array4};
use ndarray_npy::write_npy;

use chess_core::{ENCODING_PLANES, POLICY_SIZE};

use crate::data::TrainingExample;

/// Save training data to NPY files
///
/// Creates three separate files:
/// - `{path}_states.npy`: (N, 14, 8, 8) board encodings
/// - `{path}_policies.npy`: (N, 4096) policy targets
/// - `{path}_values.npy`: (N,) value targets
///
/// # Arguments
/// * `examples` - Slice of training examples to save
/// * `path` - Base path for output files (without extension)
///
/// # Example
/// ```no_run
/// use chess_selfplay::storage::save_training_data;
/// use chess_selfplay::TrainingExample;
///
/// let examples = vec![
///     TrainingExample::new(vec![0.0; 14 * 64], vec![0.0; 4096], 1.0),
/// ];
/// save_training_data(&examples, "selfplay_data").unwrap();
/// // Creates: selfplay_data_states.npy, selfplay_data_policies.npy, selfplay_data_values.npy
/// ```
pub fn save_training_data(examples: &[TrainingExample], path: &str) -> Result<()> {
    if examples.is_empty() {
        anyhow::bail!("Cannot save empty training data");
    }

    // Extract and flatten states: (N, 14, 8, 8)
    let states: Vec<f32> = examples
        .iter()
        .flat_map(|e| e.board_encoding.iter().copied())
        .collect();

    let states_array: Array4<f32> =
        Array::from_shape_vec((examples.len(), ENCODING_PLANES, 8, 8), states)?;

    // Extract and flatten policies: (N, 4096)
    let policies: Vec<f32> = examples
        .iter()
        .flat_map(|e| e.policy_target.iter().copied())
        .collect();

    let policies_array: Array2<f32> =
        Array::from_shape_vec((examples.len(), POLICY_SIZE), policies)?;

    // Extract values: (N,)
    let values: Vec<f32> = examples.iter().map(|e| e.value_target as f32).collect();
    let values_array: Array1<f32> = Array::from_vec(values);

    // Write to separate NPY files
    write_npy(format!("{}_states.npy", path), &states_array)?;
    write_npy(format!("{}_policies.npy", path), &policies_array)?;
    write_npy(format!("{}_values.npy", path), &values_array)?;

    Ok(())
}
