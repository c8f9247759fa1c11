use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub key: &'static str,
    pub name: &'static str,
    #[serde(skip)]
    pub css_vars: &'static str,
}

pub const DEFAULT_THEME: &str = "template1";

pub const THEMES: [Theme; 10] = [
    Theme {
        key: "template1",
        name: "Ocean Blue",
        css_vars: "--primary-gradient: linear-gradient(135deg, #2563eb, #0891b2);
  --accent: #2563eb; --accent-secondary: #0891b2;
  --bg: #f0f9ff; --section-alt: #ffffff;
  --card-bg: #ffffff; --text: #1e293b; --text-secondary: #475569; --text-muted: #94a3b8;
  --border: #e2e8f0;
  --tag-bg: #dbeafe; --tag-text: #1d4ed8;
  --skill-bg: linear-gradient(135deg, #3b82f6, #06b6d4); --skill-text: #ffffff;",
    },
    Theme {
        key: "template2",
        name: "Sunset Orange",
        css_vars: "--primary-gradient: linear-gradient(135deg, #f97316, #ef4444);
  --accent: #ea580c; --accent-secondary: #dc2626;
  --bg: #fff7ed; --section-alt: #ffffff;
  --card-bg: #ffffff; --text: #1c1917; --text-secondary: #57534e; --text-muted: #a8a29e;
  --border: #fed7aa;
  --tag-bg: #ffedd5; --tag-text: #c2410c;
  --skill-bg: linear-gradient(135deg, #f97316, #ef4444); --skill-text: #ffffff;",
    },
    Theme {
        key: "template3",
        name: "Forest Green",
        css_vars: "--primary-gradient: linear-gradient(135deg, #16a34a, #059669);
  --accent: #16a34a; --accent-secondary: #059669;
  --bg: #f0fdf4; --section-alt: #ffffff;
  --card-bg: #ffffff; --text: #14532d; --text-secondary: #3f6212; --text-muted: #86efac;
  --border: #bbf7d0;
  --tag-bg: #dcfce7; --tag-text: #15803d;
  --skill-bg: linear-gradient(135deg, #22c55e, #10b981); --skill-text: #ffffff;",
    },
    Theme {
        key: "template4",
        name: "Royal Purple",
        css_vars: "--primary-gradient: linear-gradient(135deg, #9333ea, #ec4899);
  --accent: #9333ea; --accent-secondary: #ec4899;
  --bg: #faf5ff; --section-alt: #ffffff;
  --card-bg: #ffffff; --text: #3b0764; --text-secondary: #6b21a8; --text-muted: #c084fc;
  --border: #e9d5ff;
  --tag-bg: #f3e8ff; --tag-text: #7c3aed;
  --skill-bg: linear-gradient(135deg, #a855f7, #ec4899); --skill-text: #ffffff;",
    },
    Theme {
        key: "template5",
        name: "Midnight Dark",
        css_vars: "--primary-gradient: linear-gradient(135deg, #1e1b4b, #312e81);
  --accent: #818cf8; --accent-secondary: #6366f1;
  --bg: #0f172a; --section-alt: #1e293b;
  --card-bg: #1e293b; --text: #f1f5f9; --text-secondary: #cbd5e1; --text-muted: #64748b;
  --border: #334155;
  --tag-bg: #312e81; --tag-text: #a5b4fc;
  --skill-bg: linear-gradient(135deg, #6366f1, #8b5cf6); --skill-text: #ffffff;",
    },
    Theme {
        key: "template6",
        name: "Teal Aqua",
        css_vars: "--primary-gradient: linear-gradient(135deg, #0d9488, #06b6d4);
  --accent: #0d9488; --accent-secondary: #06b6d4;
  --bg: #f0fdfa; --section-alt: #ffffff;
  --card-bg: #ffffff; --text: #134e4a; --text-secondary: #2dd4bf; --text-muted: #99f6e4;
  --border: #ccfbf1;
  --tag-bg: #ccfbf1; --tag-text: #0f766e;
  --skill-bg: linear-gradient(135deg, #14b8a6, #22d3ee); --skill-text: #ffffff;",
    },
    Theme {
        key: "template7",
        name: "Rose Pink",
        css_vars: "--primary-gradient: linear-gradient(135deg, #e11d48, #ec4899);
  --accent: #e11d48; --accent-secondary: #ec4899;
  --bg: #fff1f2; --section-alt: #ffffff;
  --card-bg: #ffffff; --text: #4c0519; --text-secondary: #881337; --text-muted: #fda4af;
  --border: #fecdd3;
  --tag-bg: #ffe4e6; --tag-text: #be123c;
  --skill-bg: linear-gradient(135deg, #f43f5e, #ec4899); --skill-text: #ffffff;",
    },
    Theme {
        key: "template8",
        name: "Amber Gold",
        css_vars: "--primary-gradient: linear-gradient(135deg, #d97706, #ca8a04);
  --accent: #d97706; --accent-secondary: #ca8a04;
  --bg: #fffbeb; --section-alt: #ffffff;
  --card-bg: #ffffff; --text: #451a03; --text-secondary: #78350f; --text-muted: #fbbf24;
  --border: #fde68a;
  --tag-bg: #fef3c7; --tag-text: #b45309;
  --skill-bg: linear-gradient(135deg, #f59e0b, #eab308); --skill-text: #ffffff;",
    },
    Theme {
        key: "template9",
        name: "Slate Gray",
        css_vars: "--primary-gradient: linear-gradient(135deg, #475569, #334155);
  --accent: #475569; --accent-secondary: #64748b;
  --bg: #f8fafc; --section-alt: #ffffff;
  --card-bg: #ffffff; --text: #0f172a; --text-secondary: #475569; --text-muted: #94a3b8;
  --border: #e2e8f0;
  --tag-bg: #f1f5f9; --tag-text: #334155;
  --skill-bg: linear-gradient(135deg, #64748b, #475569); --skill-text: #ffffff;",
    },
    Theme {
        key: "template10",
        name: "Indigo Violet",
        css_vars: "--primary-gradient: linear-gradient(135deg, #4f46e5, #7c3aed);
  --accent: #4f46e5; --accent-secondary: #7c3aed;
  --bg: #eef2ff; --section-alt: #ffffff;
  --card-bg: #ffffff; --text: #1e1b4b; --text-secondary: #3730a3; --text-muted: #a5b4fc;
  --border: #c7d2fe;
  --tag-bg: #e0e7ff; --tag-text: #4338ca;
  --skill-bg: linear-gradient(135deg, #6366f1, #8b5cf6); --skill-text: #ffffff;",
    },
];

/// Looks up a theme by key. Unknown keys get the default theme.
pub fn theme_for(key: &str) -> &'static Theme {
    THEMES
        .iter()
        .find(|t| t.key == key)
        .unwrap_or(&THEMES[0])
}

pub fn is_known_theme(key: &str) -> bool {
    THEMES.iter().any(|t| t.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_theme_falls_back_to_default() {
        assert_eq!(theme_for("template99").key, DEFAULT_THEME);
        assert_eq!(theme_for("").name, "Ocean Blue");
    }

    #[test]
    fn test_known_theme_lookup() {
        let theme = theme_for("template5");
        assert_eq!(theme.name, "Midnight Dark");
        assert!(theme.css_vars.contains("--bg: #0f172a"));
    }

    #[test]
    fn test_theme_keys_are_unique() {
        for (i, a) in THEMES.iter().enumerate() {
            assert!(THEMES[i + 1..].iter().all(|b| b.key != a.key));
        }
    }
}
