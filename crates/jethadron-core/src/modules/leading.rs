use crate::domain::{AnalysisLevel, HadronLike, JetLike};
use crate::modules::traits::SelectionPredicates;

/// Accepted jet together with its background-corrected transverse momentum.
#[derive(Debug)]
pub struct RankedJet<'a, J> {
    pub jet: &'a J,
    pub pt_corr: f64,
    /// Position in the event's jet table.
    pub index: usize,
}

impl<J> Clone for RankedJet<'_, J> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<J> Copy for RankedJet<'_, J> {}

#[derive(Debug)]
pub struct LeadingPair<'a, J> {
    pub leading: RankedJet<'a, J>,
    pub subleading: RankedJet<'a, J>,
}

impl<J> Clone for LeadingPair<'_, J> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<J> Copy for LeadingPair<'_, J> {}

impl<J: JetLike> LeadingPair<'_, J> {
    /// Azimuthal difference before any wrapping.
    pub fn raw_delta_phi(&self) -> f64 {
        self.leading.jet.phi() - self.subleading.jet.phi()
    }

    /// `x_J = ptSubleadingCorr / ptLeadingCorr`.
    pub fn momentum_balance(&self) -> f64 {
        self.subleading.pt_corr / self.leading.pt_corr
    }
}

/// Single-pass top-2 selection by corrected pT over accepted jets.
pub struct LeadingJetSelector<'s, S> {
    selection: &'s S,
    level: AnalysisLevel,
}

impl<'s, S> LeadingJetSelector<'s, S>
where
    S: SelectionPredicates,
{
    pub fn new(selection: &'s S, level: AnalysisLevel) -> Self {
        Self { selection, level }
    }

    pub fn select<'a, J, H>(
        &self,
        jets: &'a [J],
        hadrons: &[H],
        rho: f64,
    ) -> Option<LeadingPair<'a, J>>
    where
        J: JetLike,
        H: HadronLike,
    {
        let mut leading: Option<RankedJet<'a, J>> = None;
        let mut subleading: Option<RankedJet<'a, J>> = None;

        for (index, jet) in jets.iter().enumerate() {
            if !self.selection.is_in_eta_acceptance(jet)
                || !self.selection.is_accepted_jet(jet, hadrons, self.level)
            {
                continue;
            }
            let pt_corr = jet.corrected_pt(rho);
            if !pt_corr.is_finite() {
                continue;
            }

            let candidate = RankedJet {
                jet,
                pt_corr,
                index,
            };
            match leading {
                Some(current) if pt_corr <= current.pt_corr => {
                    if subleading.is_none_or(|second| pt_corr > second.pt_corr) {
                        subleading = Some(candidate);
                    }
                }
                _ => subleading = leading.replace(candidate),
            }
        }

        Some(LeadingPair {
            leading: leading?,
            subleading: subleading?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::LeadingJetSelector;
    use crate::common::AnalysisConfig;
    use crate::domain::{AnalysisLevel, Jet, Track};
    use crate::modules::selection::ConfiguredSelection;

    fn selection() -> ConfiguredSelection {
        ConfiguredSelection::from_config(&AnalysisConfig::default()).expect("defaults")
    }

    fn jets_from(pts: &[f64]) -> Vec<Jet> {
        pts.iter()
            .enumerate()
            .map(|(index, &pt)| Jet::new(pt, 0.0, index as f64 * 0.1, 0.4))
            .collect()
    }

    fn sorted_top_two(jets: &[Jet], rho: f64) -> Option<(usize, usize)> {
        let mut ranked: Vec<(usize, f64)> = jets
            .iter()
            .enumerate()
            .filter(|(_, jet)| jet.eta.abs() <= 0.7)
            .map(|(index, jet)| (index, jet.pt - rho * jet.area))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        match ranked.as_slice() {
            [first, second, ..] => Some((first.0, second.0)),
            _ => None,
        }
    }

    #[test]
    fn streaming_matches_sort_then_take() {
        let select = selection();
        let selector = LeadingJetSelector::new(&select, AnalysisLevel::Detector);
        let tracks: Vec<Track> = Vec::new();

        let collections: Vec<Vec<f64>> = vec![
            vec![],
            vec![42.0],
            vec![30.0, 50.0],
            vec![50.0, 30.0, 50.0],
            vec![10.0, 20.0, 20.0],
            vec![5.0, 5.0, 5.0, 5.0],
            vec![1.0, 90.0, 3.0, 70.0, 70.0, 2.0],
        ];
        for pts in collections {
            let jets = jets_from(&pts);
            let streamed = selector
                .select(&jets, &tracks, 2.0)
                .map(|pair| (pair.leading.index, pair.subleading.index));
            assert_eq!(streamed, sorted_top_two(&jets, 2.0), "pts={pts:?}");
        }

        let mut state = 17_u64;
        for _ in 0..200 {
            let mut pts = Vec::new();
            for _ in 0..(state % 9) {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                pts.push(((state >> 40) % 40) as f64);
            }
            state = state.wrapping_add(3);
            let jets = jets_from(&pts);
            let streamed = selector
                .select(&jets, &tracks, 0.0)
                .map(|pair| (pair.leading.index, pair.subleading.index));
            assert_eq!(streamed, sorted_top_two(&jets, 0.0), "pts={pts:?}");
        }
    }

    #[test]
    fn rejected_jets_never_rank() {
        let select = selection();
        let selector = LeadingJetSelector::new(&select, AnalysisLevel::Detector);
        let tracks: Vec<Track> = Vec::new();
        let jets = vec![
            Jet::new(100.0, 0.9, 0.0, 0.4),
            Jet::new(30.0, 0.1, 0.0, 0.4),
            Jet::new(20.0, -0.2, 3.0, 0.4),
            Jet::new(f64::NAN, 0.0, 1.0, 0.4),
        ];
        let pair = selector.select(&jets, &tracks, 5.0).expect("two accepted jets");
        assert_eq!(pair.leading.index, 1);
        assert_eq!(pair.subleading.index, 2);
        assert!((pair.leading.pt_corr - 28.0).abs() < 1e-12);
        assert!((pair.momentum_balance() - 18.0 / 28.0).abs() < 1e-12);
        assert!((pair.raw_delta_phi() + 3.0).abs() < 1e-12);
    }

    #[test]
    fn negative_corrected_pt_is_still_ranked() {
        let select = selection();
        let selector = LeadingJetSelector::new(&select, AnalysisLevel::Detector);
        let tracks: Vec<Track> = Vec::new();
        let jets = jets_from(&[2.0, 1.0]);
        let pair = selector
            .select(&jets, &tracks, 10.0)
            .expect("both jets accepted");
        assert_eq!(pair.leading.index, 0);
        assert!(pair.subleading.pt_corr < 0.0);
    }
}
