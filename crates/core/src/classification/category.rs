//! The expense category catalog.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Expense category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    /// Seeds, fertilizers, pesticides, soil correctives.
    AgriculturalInputs,
    /// Fuel, parts, tools, maintenance.
    MaintenanceOperation,
    /// Labor, wages, payroll charges.
    HumanResources,
    /// Freight, harvesting, drying, spraying.
    OperationalServices,
    /// Power, land lease, construction.
    InfrastructureUtilities,
    /// Professional fees, bank charges.
    Administrative,
    /// Crop, asset and credit insurance.
    InsuranceProtection,
    /// Rural and vehicle taxes, fees.
    TaxesFees,
    /// Machinery, vehicles, real estate.
    Investments,
}

/// Fiscal terms that mark a keyword list as belonging to a tax category.
const FISCAL_KEYWORDS: &[&str] = &[
    "imposto", "taxa", "icms", "ipi", "pis", "cofins", "itr", "iptu",
];

impl ExpenseCategory {
    /// All categories in catalog order.
    pub const ALL: [Self; 9] = [
        Self::AgriculturalInputs,
        Self::MaintenanceOperation,
        Self::HumanResources,
        Self::OperationalServices,
        Self::InfrastructureUtilities,
        Self::Administrative,
        Self::InsuranceProtection,
        Self::TaxesFees,
        Self::Investments,
    ];

    /// Stable code stored in the database and used in JSON.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::AgriculturalInputs => "agricultural_inputs",
            Self::MaintenanceOperation => "maintenance_operation",
            Self::HumanResources => "human_resources",
            Self::OperationalServices => "operational_services",
            Self::InfrastructureUtilities => "infrastructure_utilities",
            Self::Administrative => "administrative",
            Self::InsuranceProtection => "insurance_protection",
            Self::TaxesFees => "taxes_fees",
            Self::Investments => "investments",
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AgriculturalInputs => "INSUMOS AGRÍCOLAS",
            Self::MaintenanceOperation => "MANUTENÇÃO E OPERAÇÃO",
            Self::HumanResources => "RECURSOS HUMANOS",
            Self::OperationalServices => "SERVIÇOS OPERACIONAIS",
            Self::InfrastructureUtilities => "INFRAESTRUTURA E UTILIDADES",
            Self::Administrative => "ADMINISTRATIVAS",
            Self::InsuranceProtection => "SEGUROS E PROTEÇÃO",
            Self::TaxesFees => "IMPOSTOS E TAXAS",
            Self::Investments => "INVESTIMENTOS",
        }
    }

    /// Short description of what the category covers.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::AgriculturalInputs => "Sementes, fertilizantes, defensivos, corretivos",
            Self::MaintenanceOperation => "Combustíveis, peças, ferramentas, manutenção",
            Self::HumanResources => "Mão de obra, salários, encargos",
            Self::OperationalServices => "Frete, colheita, secagem, pulverização",
            Self::InfrastructureUtilities => "Energia, arrendamento, construções",
            Self::Administrative => "Honorários, despesas bancárias",
            Self::InsuranceProtection => "Seguro agrícola, de ativos, prestamista",
            Self::TaxesFees => "ITR, IPTU, IPVA, INCRA-CCIR",
            Self::Investments => "Máquinas, veículos, imóveis, infraestrutura",
        }
    }

    /// Lowercase keywords matched against invoice text.
    #[must_use]
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::AgriculturalInputs => &[
                "semente", "sementes", "milho", "soja", "feijão", "arroz", "trigo",
                "fertilizante", "adubo", "ureia", "npk", "superfosfato",
                "cloreto de potássio", "sulfato de amônio", "fosfato", "nitrato",
                "defensivo", "herbicida", "inseticida", "fungicida", "pesticida",
                "agrotóxico", "roundup", "glifosato", "atrazina", "corretivo",
                "calcário", "cal", "gesso", "micronutriente", "inoculante",
            ],
            // "parafuso", "porca" and "arruela" appear twice; each repeat
            // counts toward both hits and the keyword total.
            Self::MaintenanceOperation => &[
                "combustível", "diesel", "gasolina", "álcool", "etanol", "óleo",
                "lubrificante", "graxa", "fluido hidráulico", "s10", "aditivado",
                "b s10", "peça", "peças", "parafuso", "porca", "arruela", "rolamento",
                "vedação", "componente", "reparo", "reposição", "tubo", "cabo", "kit",
                "fixação", "fixacoes", "din", "parafuso", "porca", "arruela", "bucha",
                "anel", "junta", "manutenção", "conserto", "oficina", "mecânico",
                "soldagem", "pneu", "pneus", "filtro", "correia", "mangueira", "vela",
                "bateria",
            ],
            Self::HumanResources => &[
                "mão de obra", "trabalhador", "funcionário", "operário", "diarista",
                "temporário", "safrista", "salário", "ordenado", "pagamento",
                "encargo", "fgts", "inss", "vale transporte", "vale refeição",
                "cesta básica", "13º salário", "férias", "rescisão",
            ],
            Self::OperationalServices => &[
                "frete", "transporte", "carreto", "mudança", "logística", "colheita",
                "terceirizada", "colheitadeira", "prestação de serviço", "secagem",
                "armazenagem", "silo", "estocagem", "beneficiamento", "pulverização",
                "aplicação", "plantio", "semeadura", "cultivo",
            ],
            Self::InfrastructureUtilities => &[
                "energia", "elétrica", "eletricidade", "luz", "força", "arrendamento",
                "aluguel", "terra", "propriedade", "hectare", "construção", "reforma",
                "obra", "edificação", "ampliação", "material", "concreto", "cimento",
                "ferro", "madeira", "tijolo", "telha", "tinta", "hidráulico",
                "elétrico",
            ],
            Self::Administrative => &[
                "honorário", "contábil", "advocatício", "agronômico", "consultoria",
                "assessoria", "auditoria", "perícia", "despesa bancária", "financeira",
                "juros", "tarifa", "anuidade", "cartão", "conta corrente", "empréstimo",
            ],
            Self::InsuranceProtection => &[
                "seguro", "agrícola", "rural", "safra", "produtividade", "ativo",
                "máquina", "veículo", "equipamento", "prestamista", "vida", "proteção",
                "cobertura", "sinistro",
            ],
            Self::TaxesFees => &[
                "itr", "iptu", "ipva", "incra", "ccir", "imposto", "taxa",
                "contribuição", "tributo", "icms", "ipi", "pis", "cofins", "ir",
                "csll", "simples",
            ],
            Self::Investments => &[
                "aquisição", "compra", "investimento", "ativo", "máquina", "implemento",
                "trator", "colheitadeira", "plantadeira", "pulverizador", "grade",
                "arado", "equipamento", "veículo", "caminhão", "caminhonete", "carro",
                "motocicleta", "imóvel", "propriedade", "fazenda", "sítio",
                "infraestrutura", "benfeitorias", "instalações",
            ],
        }
    }

    /// Returns true when the keyword list contains fiscal terms.
    #[must_use]
    pub fn is_fiscal(self) -> bool {
        self.keywords().iter().any(|k| FISCAL_KEYWORDS.contains(k))
    }

    /// Catalog entry for API responses.
    #[must_use]
    pub fn info(self) -> CategoryInfo {
        CategoryInfo {
            code: self,
            label: self.label(),
            description: self.description(),
            keywords: self.keywords(),
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing an unknown category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown expense category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for ExpenseCategory {
    type Err = UnknownCategory;

    /// Accepts either the code or the display label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s) || c.label() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Serializable catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryInfo {
    /// Category code.
    pub code: ExpenseCategory,
    /// Display label.
    pub label: &'static str,
    /// What the category covers.
    pub description: &'static str,
    /// Keywords used by the classifier.
    pub keywords: &'static [&'static str],
}
