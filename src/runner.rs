//! The live classification loop.
//!
//! One iteration: pull the next window, extract, align, classify, render
//! one status line. Cancellation is cooperative: the flag is checked only
//! between iterations, so an iteration in progress always completes
//! before the stop takes effect. Any iteration failure ends the loop and
//! propagates to the caller; iterations leave no state behind, so a
//! failed one corrupts nothing.

use crate::core::{extract_features, select, Prediction, Windower};
use crate::model::ForestModel;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

/// One loop iteration: pull -> window -> extract -> select -> classify.
pub fn classify_once(
    windower: &mut Windower,
    trained_features: &[String],
    model: &ForestModel,
) -> Result<Prediction, Box<dyn std::error::Error>> {
    let window = windower.next_window()?;
    let features = extract_features(&window);
    let selected = select(&features, trained_features)?;
    let probs = model.predict_proba(&selected)?;
    Ok(Prediction::from_probabilities(probs))
}

/// Run the classification loop until `running` is cleared or an
/// iteration fails.
///
/// Each completed iteration writes one `\r`-prefixed status line to
/// `out`, overwriting the previous one. Returns the number of completed
/// iterations on clean cancellation.
pub fn run_loop(
    windower: &mut Windower,
    trained_features: &[String],
    model: &ForestModel,
    running: &AtomicBool,
    out: &mut impl Write,
) -> Result<u64, Box<dyn std::error::Error>> {
    let mut iterations = 0;
    while running.load(Ordering::SeqCst) {
        let prediction = classify_once(windower, trained_features, model)?;
        write!(out, "\r{}", prediction.status_line())?;
        out.flush()?;
        iterations += 1;
    }
    Ok(iterations)
}
