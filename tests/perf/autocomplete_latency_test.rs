use std::time::Instant;

use crate::autocomplete::AutoCompleter;
use crate::catalog::CommandCatalog;
use crate::history::History;
use crate::path_complete::PathSearchBounds;

fn p95_ms(samples: &mut [f64]) -> f64 {
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let last = samples.len().saturating_sub(1);
    let idx = ((last as f64) * 0.95).round() as usize;
    samples[idx.min(last)]
}

#[test]
fn warm_in_memory_completion_p95_under_10ms() {
    let catalog = CommandCatalog::from_lines(
        (0..10_000).map(|i| format!("task-{i:05} --flag value")),
    );
    let history = History::from_entries((0..1_000).map(|i| format!("deploy env-{i:04}")));
    let completer = AutoCompleter::new(Vec::new(), PathSearchBounds::default());

    // Last catalog entry, so every call scans both tiers in full.
    let input = "TASK-09999";

    for _ in 0..30 {
        let _ = completer.complete(&catalog, &history, input);
    }

    let mut batch_p95 = Vec::with_capacity(5);
    for _ in 0..5 {
        let mut samples = Vec::with_capacity(80);
        for _ in 0..80 {
            let start = Instant::now();
            let result = completer.complete(&catalog, &history, input);
            samples.push(start.elapsed().as_secs_f64() * 1000.0);
            assert_eq!(result.output_text, "task-09999");
        }
        batch_p95.push(p95_ms(&mut samples));
    }

    batch_p95.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median_p95 = batch_p95[batch_p95.len() / 2];

    assert!(
        median_p95 <= 10.0,
        "median batch p95 too high: {median_p95:.3}ms (budget 10.0ms); batches={batch_p95:?}",
    );
}
