//! Metric names of the leading-jet correlation variants.

/// Angular-gap buckets filled for soft hadrons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalCutNames {
    pub up: &'static str,
    pub md: &'static str,
    pub dw: &'static str,
    /// Same-hemisphere buckets (`etaJet1Raw > etaJet2Raw >= 0`), particle level only.
    pub hemisphere: Option<(&'static str, &'static str)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeadingMetricNames {
    pub dijet_dphi: Option<&'static str>,
    pub pair_counts: Option<&'static str>,
    pub lead_pt: Option<&'static str>,
    pub sublead_pt: Option<&'static str>,
    pub lead_corrpt: &'static str,
    pub sublead_corrpt: &'static str,
    pub pair_counts_cut: &'static str,
    pub pair_counts_cut_value: f64,
    pub lead_eta: &'static str,
    pub sublead_eta: &'static str,
    pub lead_phi: Option<&'static str>,
    pub sublead_phi: Option<&'static str>,
    pub dijet_detanoflip_dphi: &'static str,
    pub dijet_deta_dphi: &'static str,
    pub dijet_asymmetry: &'static str,
    pub jeth_detatot: &'static str,
    pub jeth_deta: &'static str,
    pub jeth_dphi: &'static str,
    pub jeth_detatot_dphi: &'static str,
    pub jeth_deta_dphi: &'static str,
    pub correlations: &'static str,
    pub physical_cuts: Option<PhysicalCutNames>,
    pub event_stats: Option<&'static str>,
}

impl LeadingMetricNames {
    /// Every name together with its dimension, for registration.
    pub fn shapes(&self) -> Vec<(&'static str, usize)> {
        let thn_dimension = if self.event_stats.is_some() { 8 } else { 7 };
        let mut shapes = vec![
            (self.lead_corrpt, 1),
            (self.sublead_corrpt, 1),
            (self.pair_counts_cut, 1),
            (self.lead_eta, 1),
            (self.sublead_eta, 1),
            (self.dijet_detanoflip_dphi, 2),
            (self.dijet_deta_dphi, 2),
            (self.dijet_asymmetry, 2),
            (self.jeth_detatot, 1),
            (self.jeth_deta, 1),
            (self.jeth_dphi, 1),
            (self.jeth_detatot_dphi, 2),
            (self.jeth_deta_dphi, 2),
            (self.correlations, thn_dimension),
        ];
        let optional_one_dimensional = [
            self.dijet_dphi,
            self.pair_counts,
            self.lead_pt,
            self.sublead_pt,
            self.lead_phi,
            self.sublead_phi,
            self.event_stats,
        ];
        shapes.extend(optional_one_dimensional.into_iter().flatten().map(|name| (name, 1)));
        if let Some(cuts) = self.physical_cuts {
            shapes.extend([(cuts.up, 2), (cuts.md, 2), (cuts.dw, 2)]);
            if let Some((hup, hdw)) = cuts.hemisphere {
                shapes.extend([(hup, 2), (hdw, 2)]);
            }
        }
        shapes
    }
}

pub const SAME_EVENT_DETECTOR: LeadingMetricNames = LeadingMetricNames {
    dijet_dphi: Some("h_dijet_dphi"),
    pair_counts: Some("h_dijet_pair_counts"),
    lead_pt: Some("h_leadjet_pt"),
    sublead_pt: Some("h_subleadjet_pt"),
    lead_corrpt: "h_leadjet_corrpt",
    sublead_corrpt: "h_subleadjet_corrpt",
    pair_counts_cut: "h_dijet_pair_counts_cut",
    pair_counts_cut_value: 2.0,
    lead_eta: "h_leadjet_eta",
    sublead_eta: "h_subleadjet_eta",
    lead_phi: Some("h_leadjet_phi"),
    sublead_phi: Some("h_subleadjet_phi"),
    dijet_detanoflip_dphi: "h2_dijet_detanoflip_dphi",
    dijet_deta_dphi: "h2_dijet_deta_dphi",
    dijet_asymmetry: "h2_dijet_Asymmetry",
    jeth_detatot: "h_jeth_detatot",
    jeth_deta: "h_jeth_deta",
    jeth_dphi: "h_jeth_dphi",
    jeth_detatot_dphi: "h2_jeth_detatot_dphi",
    jeth_deta_dphi: "h2_jeth_deta_dphi",
    correlations: "thn_jethadron_correlations",
    physical_cuts: Some(PhysicalCutNames {
        up: "h2_jeth_physicalcutsup_deta_dphi",
        md: "h2_jeth_physicalcutsmd_deta_dphi",
        dw: "h2_jeth_physicalcutsdw_deta_dphi",
        hemisphere: None,
    }),
    event_stats: None,
};

pub const SAME_EVENT_PARTICLE: LeadingMetricNames = LeadingMetricNames {
    dijet_dphi: None,
    pair_counts: Some("h_dijet_pair_counts_part"),
    lead_pt: Some("h_leadjet_pt_part"),
    sublead_pt: Some("h_subleadjet_pt_part"),
    lead_corrpt: "h_leadjet_corrpt_part",
    sublead_corrpt: "h_subleadjet_corrpt_part",
    pair_counts_cut: "h_dijet_pair_counts_cut_part",
    pair_counts_cut_value: 2.0,
    lead_eta: "h_leadjet_eta_part",
    sublead_eta: "h_subleadjet_eta_part",
    lead_phi: Some("h_leadjet_phi_part"),
    sublead_phi: Some("h_subleadjet_phi_part"),
    dijet_detanoflip_dphi: "h2_dijet_detanoflip_dphi_part",
    dijet_deta_dphi: "h2_dijet_deta_dphi_part",
    dijet_asymmetry: "h2_dijet_Asymmetry_part",
    jeth_detatot: "h_jeth_detatot_part",
    jeth_deta: "h_jeth_deta_part",
    jeth_dphi: "h_jeth_dphi_part",
    jeth_detatot_dphi: "h2_jeth_detatot_dphi_part",
    jeth_deta_dphi: "h2_jeth_deta_dphi_part",
    correlations: "thn_jethadron_correlations_part",
    physical_cuts: Some(PhysicalCutNames {
        up: "h2_jeth_physicalcutsup_deta_dphi_part",
        md: "h2_jeth_physicalcutsmd_deta_dphi_part",
        dw: "h2_jeth_physicalcutsdw_deta_dphi_part",
        hemisphere: Some((
            "h2_jeth_physicalcutsHup_deta_dphi_part",
            "h2_jeth_physicalcutsHdw_deta_dphi_part",
        )),
    }),
    event_stats: None,
};

pub const MIXED_EVENT_DETECTOR: LeadingMetricNames = LeadingMetricNames {
    dijet_dphi: Some("h_mixdijet_dphi"),
    pair_counts: None,
    lead_pt: None,
    sublead_pt: None,
    lead_corrpt: "h_mixleadjet_corrpt",
    sublead_corrpt: "h_mixsubleadjet_corrpt",
    pair_counts_cut: "h_mixdijet_pair_counts_cut",
    pair_counts_cut_value: 2.0,
    lead_eta: "h_mixleadjet_eta",
    sublead_eta: "h_mixsubleadjet_eta",
    lead_phi: None,
    sublead_phi: None,
    dijet_detanoflip_dphi: "h2_mixdijet_detanoflip_dphi",
    dijet_deta_dphi: "h2_mixdijet_deta_dphi",
    dijet_asymmetry: "h2_mixdijet_Asymmetry",
    jeth_detatot: "h_mixjeth_detatot",
    jeth_deta: "h_mixjeth_deta",
    jeth_dphi: "h_mixjeth_dphi",
    jeth_detatot_dphi: "h2_mixjeth_detatot_dphi",
    jeth_deta_dphi: "h2_mixjeth_deta_dphi",
    correlations: "thn_mixjethadron",
    physical_cuts: None,
    event_stats: Some("h_mix_event_stats"),
};

pub const MIXED_EVENT_PARTICLE: LeadingMetricNames = LeadingMetricNames {
    dijet_dphi: Some("h_mixmc_dijet_dphi"),
    pair_counts: None,
    lead_pt: None,
    sublead_pt: None,
    lead_corrpt: "h_mixmc_leadjet_corrpt",
    sublead_corrpt: "h_mixmc_subleadjet_corrpt",
    pair_counts_cut: "h_mixmc_dijet_pair_counts_cut",
    pair_counts_cut_value: 1.0,
    lead_eta: "h_mixmc_leadjet_eta",
    sublead_eta: "h_mixmc_subleadjet_eta",
    lead_phi: None,
    sublead_phi: None,
    dijet_detanoflip_dphi: "h2_mixmc_dijet_detanoflip_dphi",
    dijet_deta_dphi: "h2_mixmc_dijet_deta_dphi",
    dijet_asymmetry: "h2_mixmc_dijet_Asymmetry",
    jeth_detatot: "h_mixmc_jeth_detatot",
    jeth_deta: "h_mixmc_jeth_deta",
    jeth_dphi: "h_mixmc_jeth_dphi",
    jeth_detatot_dphi: "h2_mixmc_jeth_detatot_dphi",
    jeth_deta_dphi: "h2_mixmc_jeth_deta_dphi",
    correlations: "thn_mixmc_jethadron",
    physical_cuts: None,
    event_stats: Some("h_mixmc_event_stats"),
};

/// Plain (single-jet) jet-hadron correlation names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JetHadronMetricNames {
    pub correlations: &'static str,
    pub event_stats: &'static str,
}

impl JetHadronMetricNames {
    pub fn shapes(&self) -> [(&'static str, usize); 2] {
        [(self.correlations, 5), (self.event_stats, 1)]
    }
}

pub const JET_HADRON_SAME: JetHadronMetricNames = JetHadronMetricNames {
    correlations: "thn_jeth_correlations",
    event_stats: "h_jeth_event_stats",
};

pub const JET_HADRON_MIXED: JetHadronMetricNames = JetHadronMetricNames {
    correlations: "thn_mixjeth_correlations",
    event_stats: "h_mixjeth_event_stats",
};
