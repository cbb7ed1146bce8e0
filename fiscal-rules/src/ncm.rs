use shared_types::{NcmAnalysisResponse, NcmStatus, NcmSuggestion};
use std::collections::HashSet;

/// Share of catalog keywords a description must hit to count as a match
pub const MATCH_THRESHOLD: f64 = 0.6;
pub const MAX_SUGGESTIONS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct NcmEntry {
    pub code: &'static str,
    pub description: &'static str,
    pub keywords: &'static [&'static str],
}

const DEFAULT_ENTRIES: &[NcmEntry] = &[
    NcmEntry {
        code: "02013000",
        description: "Carnes desossadas de bovino, frescas ou refrigeradas",
        keywords: &["carne", "bovino", "desossada", "fresca", "refrigerada"],
    },
    NcmEntry {
        code: "04012010",
        description: "Leite UHT integral",
        keywords: &["leite", "uht", "integral"],
    },
    NcmEntry {
        code: "09012100",
        description: "Café torrado, não descafeinado",
        keywords: &["cafe", "torrado"],
    },
    NcmEntry {
        code: "10063021",
        description: "Arroz semibranqueado ou branqueado, polido",
        keywords: &["arroz", "branqueado", "polido"],
    },
    NcmEntry {
        code: "17019900",
        description: "Açúcar de cana refinado",
        keywords: &["acucar", "cana", "refinado"],
    },
    NcmEntry {
        code: "22011000",
        description: "Águas minerais e águas gaseificadas",
        keywords: &["agua", "mineral", "gaseificada"],
    },
    NcmEntry {
        code: "22030000",
        description: "Cervejas de malte",
        keywords: &["cerveja", "malte"],
    },
    NcmEntry {
        code: "30049099",
        description: "Medicamentos para fins terapêuticos em doses",
        keywords: &["medicamento", "terapeutico", "doses"],
    },
    NcmEntry {
        code: "33051000",
        description: "Xampus para cabelo",
        keywords: &["xampu", "cabelo"],
    },
    NcmEntry {
        code: "39233000",
        description: "Garrafas e frascos de plástico",
        keywords: &["garrafa", "frasco", "plastico"],
    },
    NcmEntry {
        code: "48025610",
        description: "Papel para escrever em folhas A4",
        keywords: &["papel", "escrever", "folha", "a4"],
    },
    NcmEntry {
        code: "61091000",
        description: "Camisetas de malha de algodão",
        keywords: &["camiseta", "malha", "algodao"],
    },
    NcmEntry {
        code: "64039990",
        description: "Calçados com sola de borracha e parte superior de couro",
        keywords: &["calcado", "sola", "borracha", "couro"],
    },
    NcmEntry {
        code: "84713012",
        description: "Computadores portáteis tipo notebook",
        keywords: &["computador", "portatil", "notebook"],
    },
    NcmEntry {
        code: "85171231",
        description: "Telefones celulares portáteis",
        keywords: &["telefone", "celular", "portatil"],
    },
    NcmEntry {
        code: "87032310",
        description: "Automóveis de passageiros com motor a gasolina",
        keywords: &["automovel", "passageiro", "motor", "gasolina"],
    },
    NcmEntry {
        code: "94036000",
        description: "Móveis de madeira",
        keywords: &["movel", "moveis", "madeira"],
    },
];

/// Lowercases and strips Portuguese diacritics
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

fn tokens(text: &str) -> HashSet<String> {
    normalize_text(text)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_code(code: &str) -> String {
    code.chars().filter(char::is_ascii_digit).collect()
}

impl NcmEntry {
    /// Fraction of this entry's keywords present in the description.
    ///
    /// A token counts when it starts with the keyword, so plurals match.
    pub fn keyword_overlap(&self, description: &str) -> f64 {
        if self.keywords.is_empty() {
            return 0.0;
        }

        let words = tokens(description);
        let hits = self
            .keywords
            .iter()
            .filter(|kw| words.iter().any(|w| w.starts_with(*kw)))
            .count();

        hits as f64 / self.keywords.len() as f64
    }

    fn matches_exactly(&self, description: &str) -> bool {
        normalize_text(description.trim()) == normalize_text(self.description)
    }
}

pub struct NcmCatalog {
    entries: Vec<NcmEntry>,
}

impl Default for NcmCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_ENTRIES.to_vec())
    }
}

impl NcmCatalog {
    pub fn new(entries: Vec<NcmEntry>) -> Self {
        Self { entries }
    }

    pub fn find(&self, code: &str) -> Option<&NcmEntry> {
        let code = normalize_code(code);
        self.entries.iter().find(|e| e.code == code)
    }

    /// Best catalog entries for a description, most similar first, ties by code
    pub fn suggestions(&self, description: &str, exclude: Option<&str>) -> Vec<NcmSuggestion> {
        let mut scored: Vec<(f64, &NcmEntry)> = self
            .entries
            .iter()
            .filter(|e| Some(e.code) != exclude)
            .map(|e| (e.keyword_overlap(description), e))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.code.cmp(b.1.code)));

        scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(score, e)| NcmSuggestion {
                ncm: e.code.to_string(),
                descricao: e.description.to_string(),
                similaridade: round2(score),
            })
            .collect()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Checks a submitted NCM code and product description against the catalog
pub fn validate_ncm(catalog: &NcmCatalog, code: &str, description: &str) -> NcmAnalysisResponse {
    let normalized = normalize_code(code);

    let Some(entry) = catalog.find(&normalized) else {
        return NcmAnalysisResponse {
            ncm: normalized,
            descricao: description.to_string(),
            status: NcmStatus::NotFound,
            confianca: 0.0,
            descricao_oficial: None,
            sugestoes: catalog.suggestions(description, None),
        };
    };

    let overlap = if entry.matches_exactly(description) {
        1.0
    } else {
        entry.keyword_overlap(description)
    };

    let (status, sugestoes) = if overlap >= MATCH_THRESHOLD {
        (NcmStatus::Correct, Vec::new())
    } else {
        (
            NcmStatus::Incorrect,
            catalog.suggestions(description, Some(entry.code)),
        )
    };

    NcmAnalysisResponse {
        ncm: normalized,
        descricao: description.to_string(),
        status,
        confianca: round2(overlap),
        descricao_oficial: Some(entry.description.to_string()),
        sugestoes,
    }
}
