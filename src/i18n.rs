// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持中文（默认）、英文、德文
// 诊断消息与命令行输出均经由此处翻译
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 默认语言
pub const DEFAULT_LOCALE: &str = "zh-CN";

/// 已提供翻译的语言
pub const SUPPORTED_LOCALES: [&str; 3] = ["zh-CN", "en", "de"];

/// 选择语言的环境变量
pub const LOCALE_ENV: &str = "STEEL_EXTRACTOR_LOCALE";

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"zh-CN" / "en" / "de"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 将系统风格的语言标识映射到已支持的语言
///
/// 接受 "de_DE.UTF-8"、"en-US"、"zh" 等写法，按主语言匹配；不支持时返回 None
pub fn resolve_locale(raw: &str) -> Option<&'static str> {
    let primary = raw
        .trim()
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .split(['_', '-'])
        .next()
        .unwrap_or_default()
        .to_lowercase();

    match primary.as_str() {
        "zh" => Some("zh-CN"),
        "en" => Some("en"),
        "de" => Some("de"),
        _ => None,
    }
}

/// 按环境变量设置语言，返回实际使用的语言
///
/// 未设置或不支持时保持默认语言
pub fn init_from_env() -> &'static str {
    let locale = std::env::var(LOCALE_ENV)
        .ok()
        .and_then(|raw| {
            let resolved = resolve_locale(&raw);
            if resolved.is_none() {
                tracing::warn!(locale = %raw, "不支持的语言，使用默认语言");
            }
            resolved
        })
        .unwrap_or(DEFAULT_LOCALE);
    set_locale(locale);
    locale
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use steel_material_extractor::i18n::t;
/// let msg = t("cli.usage");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数，占位符写作 %{name}）
///
/// # 示例
/// ```no_run
/// use steel_material_extractor::i18n::t_with_args;
/// let msg = t_with_args("diagnostic.no_grade", &[("text", "###unknown###")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter()
        .fold(rust_i18n::t!(key).to_string(), |msg, (k, v)| {
            msg.replace(&format!("%{{{}}}", k), v)
        })
}
