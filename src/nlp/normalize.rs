//! Deterministic text cleanup and tokenization.
//!
//! `clean_text` is the unlowered pre-filter; `normalize` is the full
//! pipeline used as the tokenizer inside feature extraction. Both are
//! pure functions of their input — no I/O, no shared mutable state.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Portuguese stop words, embedded to avoid a runtime download.
const STOPWORDS_PT: &[&str] = &[
    "a", "ao", "aos", "aquela", "aquelas", "aquele", "aqueles", "aquilo", "as", "até", "com",
    "como", "da", "das", "do", "dos", "e", "ela", "elas", "ele", "eles", "em", "entre", "era",
    "eram", "essa", "essas", "esse", "esses", "esta", "estamos", "estas", "estava", "estavam",
    "este", "esteja", "estejam", "estejamos", "estes", "esteve", "estive", "estivemos", "estiver",
    "estivera", "estiveram", "estiverem", "estivermos", "estivesse", "estivessem", "estivéramos",
    "estivéssemos", "estou", "está", "estão", "eu", "foi", "fomos", "for", "fora", "foram",
    "forem", "formos", "fosse", "fossem", "fui", "fôramos", "fôssemos", "haja", "hajam",
    "hajamos", "havemos", "havia", "hei", "houve", "houvemos", "houver", "houvera", "houveram",
    "houverei", "houverem", "houveremos", "houveria", "houveriam", "houveríamos", "houverão",
    "houverá", "houvesse", "houvessem", "houvéramos", "houvéssemos", "há", "hão", "isso", "isto",
    "já", "lhe", "lhes", "mais", "mas", "me", "mesmo", "meu", "meus", "minha", "minhas", "muito",
    "na", "nas", "nem", "no", "nos", "nossa", "nossas", "nosso", "nossos", "num", "numa", "não",
    "nós", "o", "os", "ou", "para", "pela", "pelas", "pelo", "pelos", "por", "qual", "quando",
    "que", "quem", "se", "seja", "sejam", "sejamos", "sem", "ser", "seria", "seriam", "será",
    "serão", "seríamos", "seu", "seus", "sua", "suas", "são", "só", "também", "te", "tem",
    "temos", "tenha", "tenham", "tenhamos", "tenho", "ter", "terei", "teremos", "teria",
    "teriam", "terá", "terão", "teríamos", "teve", "tinha", "tinham", "tive", "tivemos", "tiver",
    "tivera", "tiveram", "tiverem", "tivermos", "tivesse", "tivessem", "tivéramos",
    "tivéssemos", "tu", "tua", "tuas", "tém", "tínhamos", "um", "uma", "você", "vocês", "vos",
    "à", "às", "éramos",
];

static STOPWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOPWORDS_PT.iter().copied().collect());

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\S+|www\.\S+").expect("valid URL regex"));

/// Anything outside extended Latin letters, digits, `@ . , ! ?` and space.
static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-zÀ-ÖØ-öø-ÿ0-9@.,!? ]+").expect("valid charset regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Unlowered cleanup: newlines to spaces, URLs stripped, disallowed
/// characters removed, whitespace collapsed and trimmed.
pub fn clean_text(text: &str) -> String {
    let text = text.replace(['\r', '\n'], " ");
    let text = URL_RE.replace_all(&text, "");
    let text = DISALLOWED_RE.replace_all(&text, " ");
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Full normalization: cleanup, lower-case, stop-word removal.
///
/// Total and idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let cleaned = clean_text(text).to_lowercase();
    cleaned
        .split_whitespace()
        .filter(|t| !STOPWORD_SET.contains(t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tokenization for the classifier's feature extractor: `normalize`,
/// then trim edge punctuation so "senha?" and "senha" share a
/// vocabulary entry, the way a word-boundary token pattern would.
pub fn feature_tokens(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(|t| t.trim_matches(|c| matches!(c, '.' | ',' | '!' | '?' | '@')))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
