//! Static reference tables shipped with the engine.
//!
//! These are configuration data, not logic: floor-kind coefficient ranges,
//! bounds for the two redistributable percentage sets and the default monthly
//! site-administration budget.

use crate::monthly::MonthlyBudget;
use crate::share::{ShareBounds, ShareItem, ShareSet, ShareSetKind};

/// Floor kind counted as sellable private area.
pub const PRIVATE_AREA_KIND: &str = "Área Privativa (Autônoma)";

/// Floor kind → `(min_coef, max_coef)`.
pub const FLOOR_KINDS: &[(&str, f64, f64)] = &[
    (PRIVATE_AREA_KIND, 1.00, 1.00),
    ("Áreas de lazer ambientadas", 2.00, 4.00),
    ("Varandas", 0.75, 1.00),
    ("Terraços / Áreas Descobertas", 0.30, 0.60),
    ("Garagem (Subsolo)", 0.50, 0.75),
    ("Estacionamento (terreno)", 0.05, 0.10),
    ("Salas com Acabamento", 1.00, 1.00),
    ("Salas sem Acabamento", 0.75, 0.90),
    ("Loja sem Acabamento", 0.40, 0.60),
    ("Serviço (unifam. baixa, aberta)", 0.50, 0.50),
    ("Barrilete / Cx D'água / Casa Máquinas", 0.50, 0.75),
    ("Piscinas", 0.50, 0.75),
    ("Quintais / Calçadas / Jardins", 0.10, 0.30),
    ("Projeção Terreno sem Benfeitoria", 0.00, 0.00),
];

/// Direct-cost stage → `(min%, default%, max%)` of the direct cost.
pub const DIRECT_COST_STAGES: &[(&str, f64, f64, f64)] = &[
    ("Serviços Preliminares e Fundações", 7.0, 8.0, 9.0),
    ("Estrutura (Supraestrutura)", 14.0, 16.0, 22.0),
    ("Vedações (Alvenaria)", 8.0, 10.0, 15.0),
    ("Cobertura e Impermeabilização", 4.0, 5.0, 8.0),
    ("Revestimentos de Fachada", 5.0, 6.0, 10.0),
    ("Instalações (Elétrica e Hidráulica)", 12.0, 15.0, 18.0),
    ("Esquadrias (Portas e Janelas)", 6.0, 8.0, 12.0),
    ("Revestimentos de Piso", 8.0, 10.0, 15.0),
    ("Revestimentos de Parede", 6.0, 8.0, 12.0),
    ("Revestimentos de Forro", 3.0, 4.0, 6.0),
    ("Pintura", 4.0, 5.0, 8.0),
    ("Serviços Complementares e Externos", 3.0, 5.0, 10.0),
];

/// Indirect-cost item → `(min%, default%, max%)` of the VGV.
pub const INDIRECT_COST_ITEMS: &[(&str, f64, f64, f64)] = &[
    ("IRPJ/ CS/ PIS/ COFINS", 3.0, 4.0, 6.0),
    ("Corretagem", 3.0, 3.61, 5.0),
    ("Publicidade", 0.5, 0.9, 2.0),
    ("Manutenção", 0.3, 0.5, 1.0),
    ("Custo Fixo da Incorporadora", 3.0, 4.0, 6.0),
    ("Assessoria Técnica", 0.5, 0.7, 1.5),
    ("Projetos", 0.4, 0.52, 1.5),
    ("Licenças e Incorporação", 0.1, 0.2, 0.5),
    ("Outorga Onerosa", 0.0, 0.0, 10.0),
    ("Condomínio", 0.0, 0.0, 0.5),
    ("IPTU", 0.05, 0.07, 0.2),
    ("Preparação do Terreno", 0.2, 0.33, 1.0),
    ("Financiamento Bancário", 1.0, 1.9, 3.0),
];

/// Default monthly site-administration items → amount per month.
pub const MONTHLY_SITE_COSTS: &[(&str, f64)] = &[
    ("Administração de Obra (Engenheiro/Arquiteto)", 15000.0),
    ("Mestre de Obras e Encarregados", 8000.0),
    ("Aluguel de Equipamentos (andaimes, betoneira, etc.)", 5000.0),
    ("Consumo de Energia", 1000.0),
    ("Consumo de Água", 500.0),
    ("Telefone e Internet", 300.0),
    ("Seguros e Licenças de Canteiro", 1200.0),
    ("Transporte de Materiais e Pessoas", 2500.0),
    ("Despesas de Escritório e Apoio", 800.0),
];

/// Admissible coefficient range of a floor kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientRange {
    /// Lowest coefficient, also the default when a floor has none.
    pub min: f64,
    /// Highest coefficient.
    pub max: f64,
}

impl CoefficientRange {
    /// Range used for kinds missing from the table.
    pub const FALLBACK: Self = Self { min: 1.0, max: 1.0 };

    /// Clamps `value` into the range.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

/// Floor kind → coefficient range lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientTable {
    kinds: Vec<(String, CoefficientRange)>,
}

impl Default for CoefficientTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl CoefficientTable {
    /// The table built from [`FLOOR_KINDS`].
    #[must_use]
    pub fn standard() -> Self {
        Self::from_entries(FLOOR_KINDS.iter().copied())
    }

    /// Builds a table from `(kind, min, max)` entries.
    pub fn from_entries<K: Into<String>>(entries: impl IntoIterator<Item = (K, f64, f64)>) -> Self {
        Self {
            kinds: entries
                .into_iter()
                .map(|(k, min, max)| (k.into(), CoefficientRange { min, max }))
                .collect(),
        }
    }

    /// Range of `kind`, or [`CoefficientRange::FALLBACK`] when unknown.
    #[must_use]
    pub fn range(&self, kind: &str) -> CoefficientRange {
        self.get(kind).unwrap_or(CoefficientRange::FALLBACK)
    }

    /// Range of `kind`, if known.
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<CoefficientRange> {
        self.kinds.iter().find(|(k, _)| k == kind).map(|(_, r)| *r)
    }

    /// Known kinds in table order.
    pub fn kinds(&self) -> impl Iterator<Item = (&str, CoefficientRange)> {
        self.kinds.iter().map(|(k, r)| (k.as_str(), *r))
    }
}

/// Share key → bounds lookup for one redistributable set.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundsTable {
    entries: Vec<(String, ShareBounds)>,
}

impl BoundsTable {
    /// Bounds of the construction stages.
    #[must_use]
    pub fn direct_cost_stages() -> Self {
        Self::from_entries(DIRECT_COST_STAGES.iter().copied())
    }

    /// Bounds of the percentage-based indirect costs.
    #[must_use]
    pub fn indirect_cost_items() -> Self {
        Self::from_entries(INDIRECT_COST_ITEMS.iter().copied())
    }

    /// Standard table of a share-set kind.
    #[must_use]
    pub fn for_kind(kind: ShareSetKind) -> Self {
        match kind {
            ShareSetKind::DirectCostStages => Self::direct_cost_stages(),
            ShareSetKind::IndirectCostItems => Self::indirect_cost_items(),
        }
    }

    /// Builds a table from `(key, min, default, max)` entries.
    pub fn from_entries<K: Into<String>>(
        entries: impl IntoIterator<Item = (K, f64, f64, f64)>,
    ) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, min, d, max)| (k.into(), ShareBounds::new(min, d, max)))
                .collect(),
        }
    }

    /// Bounds of `key`, or [`ShareBounds::UNBOUNDED`] when unknown.
    #[must_use]
    pub fn bounds(&self, key: &str) -> ShareBounds {
        self.get(key).unwrap_or(ShareBounds::UNBOUNDED)
    }

    /// Bounds of `key`, if known.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<ShareBounds> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, b)| *b)
    }

    /// Known keys in table order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// A fresh set holding every key at its default percentage.
    #[must_use]
    pub fn default_shares(&self) -> ShareSet {
        self.entries.iter().map(|(k, b)| ShareItem::manual(k.clone(), b.default)).collect()
    }
}

/// The default monthly site-administration budget.
#[must_use]
pub fn default_monthly_budget() -> MonthlyBudget {
    MONTHLY_SITE_COSTS.iter().copied().collect()
}
