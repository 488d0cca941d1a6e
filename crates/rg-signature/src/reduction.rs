//! Signature reduction pipeline
//!
//! Culls a noisy signature corpus down to a few representatives per preset:
//! 1. Threshold dedup: drop any signature too close to an earlier survivor
//! 2. Per-preset cap: keep the members of the most dissimilar pairs
//!
//! Both stages copy their input; callers keep ownership of the corpus.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ReductionConfig;
use crate::error::{SignatureError, SignatureResult};
use crate::signature::{Signature, signature_difference};

/// Signature counts at each pipeline stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionReport {
    /// Signatures handed to the pipeline
    pub input: usize,
    /// Survivors of threshold dedup
    pub after_dedup: usize,
    /// Distinct presets among the survivors
    pub presets: usize,
    /// Presets that exceeded the cap and were resampled
    pub capped_presets: usize,
    /// Final output size
    pub output: usize,
}

/// Drop every signature closer than `threshold` to an earlier survivor
///
/// Order dependent: the earliest member of each similarity cluster is kept.
/// Signatures with an invalid preset are dropped as well.
pub fn reduce_by_difference(signatures: &[Signature], threshold: f32) -> Vec<Signature> {
    let mut keep: Vec<bool> = signatures.iter().map(Signature::is_valid).collect();

    for j in 0..signatures.len() {
        if !keep[j] {
            continue;
        }
        for i in (j + 1)..signatures.len() {
            if keep[i] && signature_difference(&signatures[i], &signatures[j]) < threshold {
                keep[i] = false;
            }
        }
    }

    signatures
        .iter()
        .zip(keep)
        .filter_map(|(sig, kept)| kept.then(|| sig.clone()))
        .collect()
}

/// Keep `size` signatures, favoring members of the most dissimilar pairs
///
/// Every pair `(j, i)` with `j < i` is scored and credited to `i`. Scores are
/// walked from largest to smallest and each index is taken on first sight.
/// Requires `size < signatures.len()`.
pub fn reduce_by_size(signatures: &[Signature], size: usize) -> SignatureResult<Vec<Signature>> {
    if size >= signatures.len() {
        return Err(SignatureError::UndersizedCorpus {
            requested: size,
            available: signatures.len(),
        });
    }

    let mut diffs: Vec<(usize, f32)> = (0..signatures.len())
        .into_par_iter()
        .flat_map_iter(|j| {
            ((j + 1)..signatures.len())
                .map(move |i| (i, signature_difference(&signatures[i], &signatures[j])))
        })
        .collect();

    // Stable, so equal scores keep pair order
    diffs.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut selected = vec![false; signatures.len()];
    let mut reduced = Vec::with_capacity(size);
    for (index, _) in diffs {
        if reduced.len() == size {
            break;
        }
        if !selected[index] {
            selected[index] = true;
            reduced.push(signatures[index].clone());
        }
    }

    // Index 0 is never credited, so n - 1 distinct indices are reachable
    debug_assert_eq!(reduced.len(), size);
    Ok(reduced)
}

/// Reduce a corpus with the default thresholds
pub fn reduce_signatures(signatures: &[Signature]) -> Vec<Signature> {
    match reduce_signatures_report(signatures, &ReductionConfig::default()) {
        Ok((reduced, _)) => reduced,
        // Defaults always validate and capped groups always exceed the cap
        Err(e) => unreachable!("default reduction failed: {e}"),
    }
}

/// Reduce a corpus with custom thresholds
pub fn reduce_signatures_with(
    signatures: &[Signature],
    config: &ReductionConfig,
) -> SignatureResult<Vec<Signature>> {
    reduce_signatures_report(signatures, config).map(|(reduced, _)| reduced)
}

/// Reduce a corpus and report counts for each stage
///
/// Groups are emitted in ascending preset order. Groups at or below the cap
/// pass through untouched.
pub fn reduce_signatures_report(
    signatures: &[Signature],
    config: &ReductionConfig,
) -> SignatureResult<(Vec<Signature>, ReductionReport)> {
    config.validate()?;

    let deduped = reduce_by_difference(signatures, config.min_viable_difference);
    let mut report = ReductionReport {
        input: signatures.len(),
        after_dedup: deduped.len(),
        ..Default::default()
    };
    log::debug!(
        "Signature dedup: {} -> {} (threshold {})",
        report.input,
        report.after_dedup,
        config.min_viable_difference
    );

    let mut groups: BTreeMap<usize, Vec<Signature>> = BTreeMap::new();
    for sig in deduped {
        groups.entry(sig.preset_index).or_default().push(sig);
    }
    report.presets = groups.len();

    let cap = config.max_signatures_per_preset;
    let mut reduced =
        Vec::with_capacity(report.after_dedup.min(groups.len().saturating_mul(cap)));
    for (preset, group) in groups {
        if group.len() > cap {
            log::trace!("Preset {}: capping {} signatures to {}", preset, group.len(), cap);
            report.capped_presets += 1;
            reduced.extend(reduce_by_size(&group, cap)?);
        } else {
            reduced.extend(group);
        }
    }
    report.output = reduced.len();

    log::debug!(
        "Signature reduction: {} presets, {} capped, {} signatures kept",
        report.presets,
        report.capped_presets,
        report.output
    );
    Ok((reduced, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::{ABSORPTION_BIN_COUNT, DISTANCE_BIN_COUNT};
    use crate::signature::INVALID_PRESET;

    /// Signature with all distance mass in one bin and flat absorption
    fn at_bin(preset_index: usize, bin: usize) -> Signature {
        let mut distances = [0.0; DISTANCE_BIN_COUNT];
        distances[bin] = 1.0;
        Signature::new(
            preset_index,
            distances,
            [1.0 / ABSORPTION_BIN_COUNT as f32; ABSORPTION_BIN_COUNT],
        )
    }

    #[test]
    fn test_dedup_keeps_earliest() {
        let sigs = vec![at_bin(0, 2), at_bin(1, 2), at_bin(2, 5), at_bin(3, 2)];
        let reduced = reduce_by_difference(&sigs, 0.02);

        let presets: Vec<usize> = reduced.iter().map(|s| s.preset_index).collect();
        assert_eq!(presets, vec![0, 2]);
    }

    #[test]
    fn test_dedup_order_dependence() {
        let forward = vec![at_bin(7, 1), at_bin(8, 1)];
        let backward = vec![at_bin(8, 1), at_bin(7, 1)];

        assert_eq!(reduce_by_difference(&forward, 0.02)[0].preset_index, 7);
        assert_eq!(reduce_by_difference(&backward, 0.02)[0].preset_index, 8);
    }

    #[test]
    fn test_dedup_drops_invalid() {
        let sigs = vec![at_bin(INVALID_PRESET, 0), at_bin(1, 0)];
        let reduced = reduce_by_difference(&sigs, 0.02);
        assert_eq!(reduced.len(), 1);
        assert_eq!(reduced[0].preset_index, 1);
    }

    #[test]
    fn test_dedup_does_not_mutate_input() {
        let sigs = vec![at_bin(0, 0), at_bin(0, 0)];
        let before = sigs.clone();
        let _ = reduce_by_difference(&sigs, 0.5);
        assert_eq!(sigs, before);
    }

    #[test]
    fn test_size_prefers_extremes() {
        // Bins 0 and 10 form the most dissimilar pair; index 0 is never credited,
        // so the partner at index 3 comes first, then the next most distant one
        let sigs = vec![at_bin(0, 0), at_bin(0, 4), at_bin(0, 5), at_bin(0, 10)];
        let reduced = reduce_by_size(&sigs, 2).unwrap();

        let bins: Vec<usize> = reduced
            .iter()
            .map(|s| s.distances.iter().position(|v| *v == 1.0).unwrap())
            .collect();
        assert_eq!(bins, vec![10, 5]);
    }

    #[test]
    fn test_size_tied_scores_keep_pair_order() {
        // Alternating peaks: every cross pair ties at the top score, credited
        // to a different index each time. Pair order alone decides the picks.
        let sigs: Vec<Signature> = (0..12)
            .map(|i| at_bin(i, if i % 2 == 0 { 0 } else { 10 }))
            .collect();
        let reduced = reduce_by_size(&sigs, 5).unwrap();

        // First anchor (index 0) credits every odd partner in ascending order
        let picked: Vec<usize> = reduced.iter().map(|s| s.preset_index).collect();
        assert_eq!(picked, vec![1, 3, 5, 7, 9]);

        let picked: Vec<usize> = reduce_by_size(&sigs, 7)
            .unwrap()
            .iter()
            .map(|s| s.preset_index)
            .collect();
        // Odd partners of index 0 run out, then index 1 credits the evens
        assert_eq!(picked, vec![1, 3, 5, 7, 9, 11, 2]);
    }

    #[test]
    fn test_size_precondition() {
        let sigs = vec![at_bin(0, 0), at_bin(0, 1), at_bin(0, 2)];
        assert_eq!(
            reduce_by_size(&sigs, 3),
            Err(SignatureError::UndersizedCorpus {
                requested: 3,
                available: 3
            })
        );
        assert_eq!(reduce_by_size(&sigs, 2).unwrap().len(), 2);
        assert!(reduce_by_size(&sigs, 0).unwrap().is_empty());
    }

    #[test]
    fn test_groups_below_cap_pass_through() {
        let sigs = vec![at_bin(3, 0), at_bin(3, 4), at_bin(1, 8)];
        let reduced = reduce_signatures(&sigs);

        // Ascending preset order, members untouched
        assert_eq!(reduced, vec![at_bin(1, 8), at_bin(3, 0), at_bin(3, 4)]);
    }

    #[test]
    fn test_cap_applied_per_preset() {
        let mut sigs: Vec<Signature> = (0..DISTANCE_BIN_COUNT).map(|b| at_bin(0, b)).collect();
        // Distinct absorption keeps preset 1 clear of preset 0 during dedup
        for bin in [0, 10] {
            let mut sig = at_bin(1, bin);
            sig.absorb_coeffs = [0.0; ABSORPTION_BIN_COUNT];
            sig.absorb_coeffs[0] = 1.0;
            sigs.push(sig);
        }

        let (reduced, report) =
            reduce_signatures_report(&sigs, &ReductionConfig::default()).unwrap();

        assert_eq!(reduced.iter().filter(|s| s.preset_index == 0).count(), 5);
        assert_eq!(reduced.iter().filter(|s| s.preset_index == 1).count(), 2);
        assert_eq!(
            report,
            ReductionReport {
                input: 13,
                after_dedup: 13,
                presets: 2,
                capped_presets: 1,
                output: 7,
            }
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ReductionConfig::default().with_max_signatures_per_preset(0);
        assert!(reduce_signatures_with(&[at_bin(0, 0)], &config).is_err());
    }

    #[test]
    fn test_empty_corpus() {
        assert!(reduce_signatures(&[]).is_empty());
    }
}
