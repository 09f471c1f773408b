//! 심볼 정규화.
//!
//! 스캐너, DB, 사용자 입력에서 들어온 티커에는 제로폭 공백이나 개행이
//! 섞여 있는 경우가 있어, 저장 전에 항상 같은 형태로 맞춥니다.

use std::collections::HashSet;

/// 심볼에서 제거하는 문자 (제로폭 문자, BOM, 탭, 개행, 공백).
const STRIPPED_CHARS: [char; 9] = [
    '\u{200b}', // zero width space
    '\u{200c}', // zero width non-joiner
    '\u{200d}', // zero width joiner
    '\u{2060}', // word joiner
    '\u{feff}', // BOM
    '\t',
    '\n',
    '\r',
    ' ',
];

/// 원시 심볼을 정규화합니다.
///
/// 결과가 빈 문자열이면 유효하지 않은 심볼입니다.
pub fn normalize_symbol(raw: &str) -> String {
    raw.chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_uppercase()
}

/// 심볼 목록을 정규화합니다.
///
/// 빈 심볼은 버리고, 중복은 처음 나온 순서를 유지하며 제거합니다.
pub fn normalize_symbols<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|s| normalize_symbol(s.as_ref()))
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.clone()))
        .collect()
}
