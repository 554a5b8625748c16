use crate::models::MsSpectrum;

/// Intensities below this are treated as zero by the run collapser.
const NEAR_ZERO_INTENSITY: f32 = f32::EPSILON;

fn in_ignore(mz: f64, ignore_range: Option<(f64, f64)>) -> bool {
    match ignore_range {
        Some((start, end)) => mz >= start && mz <= end,
        None => false,
    }
}

/// Two-pass in-place spectral compression.
///
/// Pass 1 collapses every maximal run of two or more zero-intensity points to
/// its first and last member. Pass 2 merges chains of points spaced closer
/// than `mz_resolution`, keeping only the most intense point of each chain.
/// Points inside `ignore_range` (the reporter-ion protection band) never
/// participate in merging, and a chain ends when it reaches the band.
///
/// Both passes are forward copy-compactions followed by a truncate, so the
/// arrays are shrunk, not reallocated. Applying the compression twice with
/// the same settings yields the same result as applying it once.
pub fn compress_spectra_data(
    spectrum: &mut MsSpectrum,
    mz_resolution: f64,
    ignore_range: Option<(f64, f64)>,
) {
    if spectrum.mz.len() != spectrum.intensities.len() {
        return;
    }
    collapse_zero_runs(spectrum);
    if mz_resolution > 0.0 {
        merge_by_resolution(spectrum, mz_resolution, ignore_range);
    }
}

fn collapse_zero_runs(spectrum: &mut MsSpectrum) {
    let count = spectrum.ion_count();
    let mut target = 0;
    let mut index = 0;
    while index < count {
        if spectrum.intensities[index].abs() >= NEAR_ZERO_INTENSITY {
            copy_point(spectrum, index, target);
            target += 1;
            index += 1;
            continue;
        }
        // Extend over the whole zero run, keep its first and last member.
        let run_start = index;
        let mut run_end = index;
        while run_end + 1 < count && spectrum.intensities[run_end + 1].abs() < NEAR_ZERO_INTENSITY {
            run_end += 1;
        }
        copy_point(spectrum, run_start, target);
        target += 1;
        if run_end > run_start {
            copy_point(spectrum, run_end, target);
            target += 1;
        }
        index = run_end + 1;
    }
    spectrum.truncate(target);
}

fn merge_by_resolution(
    spectrum: &mut MsSpectrum,
    mz_resolution: f64,
    ignore_range: Option<(f64, f64)>,
) {
    let count = spectrum.ion_count();
    let mut target = 0;
    let mut index = 0;
    while index < count {
        let starts_chain = spectrum.intensities[index] > 0.0
            && !in_ignore(spectrum.mz[index], ignore_range);
        if !starts_chain {
            copy_point(spectrum, index, target);
            target += 1;
            index += 1;
            continue;
        }
        // Chain forward while the gap to the previous member stays within
        // resolution; the protection band terminates the chain.
        let mut best = index;
        let mut chain_end = index;
        while chain_end + 1 < count
            && spectrum.mz[chain_end + 1] - spectrum.mz[chain_end] <= mz_resolution
            && !in_ignore(spectrum.mz[chain_end + 1], ignore_range)
        {
            chain_end += 1;
            if spectrum.intensities[chain_end] > spectrum.intensities[best] {
                best = chain_end;
            }
        }
        copy_point(spectrum, best, target);
        target += 1;
        index = chain_end + 1;
    }
    spectrum.truncate(target);
}

fn copy_point(spectrum: &mut MsSpectrum, source: usize, target: usize) {
    if source != target {
        spectrum.mz[target] = spectrum.mz[source];
        spectrum.intensities[target] = spectrum.intensities[source];
    }
}
