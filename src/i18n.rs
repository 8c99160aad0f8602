// i18n.rs
//
// 运行时多语言：
// - 字符串表：assets/i18n.json（格式：{ "<lang>": { "key": "value" } }）
//   查找顺序：<exe_dir>/assets -> ./assets -> 编译期内嵌副本
// - 回退语言：en
// - 查询：tr("key") / tr_with("key", [("name", "...")])，{name} 为占位符
//
// 语言选择：
// - CLI: --lang <code>（en, zh-Hans）
// - Env: GLOBE_LANG
// - 默认: en

use once_cell::sync::OnceCell;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

const FALLBACK_LANG: &str = "en";
const EMBEDDED: &str = include_str!("../assets/i18n.json");

/// Languages offered in the UI: `(code, native name)`.
pub const LANGUAGES: [(&str, &str); 2] = [("en", "English"), ("zh-Hans", "简体中文")];

#[derive(Debug, Clone)]
pub struct I18n {
    lang: String,
    map: HashMap<String, String>,
    fallback_map: HashMap<String, String>,
}

static I18N: OnceCell<RwLock<I18n>> = OnceCell::new();

fn parse_lang(text: &str, lang: &str) -> Option<HashMap<String, String>> {
    let all: HashMap<String, HashMap<String, String>> = serde_json::from_str(text).ok()?;
    all.get(lang).cloned()
}

fn find_table_file() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let p = dir.join("assets").join("i18n.json");
            if p.exists() {
                return Some(p);
            }
        }
    }

    let p = PathBuf::from("assets").join("i18n.json");
    p.exists().then_some(p)
}

fn load_from(path: &Path, lang: &str) -> Option<HashMap<String, String>> {
    let text = std::fs::read_to_string(path).ok()?;
    parse_lang(&text, lang)
}

fn load_lang(lang: &str) -> HashMap<String, String> {
    if let Some(m) = find_table_file().and_then(|p| load_from(&p, lang)) {
        return m;
    }
    parse_lang(EMBEDDED, lang).unwrap_or_default()
}

/// Initialize global i18n. Later calls switch the current language.
pub fn init(lang: impl Into<String>) {
    let lang = lang.into();
    let map = load_lang(&lang);
    let fallback_map = if lang == FALLBACK_LANG {
        map.clone()
    } else {
        load_lang(FALLBACK_LANG)
    };
    let i = I18n { lang, map, fallback_map };
    if i.map.is_empty() {
        log::warn!("no strings for language {}, falling back to {FALLBACK_LANG}", i.lang);
    }

    if let Some(lock) = I18N.get() {
        if let Ok(mut w) = lock.write() {
            *w = i;
        }
    } else {
        let _ = I18N.set(RwLock::new(i));
    }
}

fn get_locked() -> Option<std::sync::RwLockReadGuard<'static, I18n>> {
    I18N.get().and_then(|l| l.read().ok())
}

/// Localized text for `key`, or the key itself when missing.
pub fn tr(key: &str) -> String {
    let Some(i) = get_locked() else {
        return key.to_string();
    };

    i.map
        .get(key)
        .or_else(|| i.fallback_map.get(key))
        .cloned()
        .unwrap_or_else(|| key.to_string())
}

/// Localized text with `{name}` placeholders substituted. Unknown placeholders are kept.
pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    let mut s = tr(key);
    for (k, v) in args {
        s = s.replace(&format!("{{{k}}}"), v);
    }
    s
}

pub fn resolve_lang_from_args() -> String {
    let mut it = std::env::args();
    while let Some(a) = it.next() {
        if a == "--lang" {
            if let Some(v) = it.next() {
                return v;
            }
        }
    }

    if let Ok(v) = std::env::var("GLOBE_LANG") {
        if !v.trim().is_empty() {
            return v;
        }
    }

    FALLBACK_LANG.to_string()
}
