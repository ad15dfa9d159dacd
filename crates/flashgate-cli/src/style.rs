use console::style;

/// Theme for styled terminal output
#[derive(Clone)]
pub struct Theme {
    pub accent: fn(&str) -> console::StyledObject<&str>,
    pub success: fn(&str) -> console::StyledObject<&str>,
    pub warning: fn(&str) -> console::StyledObject<&str>,
    pub muted: fn(&str) -> console::StyledObject<&str>,
    pub bold: fn(&str) -> console::StyledObject<&str>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: |s| style(s).cyan().bold(),
            success: |s| style(s).green().bold(),
            warning: |s| style(s).yellow(),
            muted: |s| style(s).dim(),
            bold: |s| style(s).bold(),
        }
    }
}

impl Theme {
    pub fn no_color() -> Self {
        Self {
            accent: |s| style(s),
            success: |s| style(s),
            warning: |s| style(s),
            muted: |s| style(s),
            bold: |s| style(s),
        }
    }

    /// Green for true, yellow for false.
    pub fn flag(&self, value: bool) -> String {
        if value {
            (self.success)("yes").to_string()
        } else {
            (self.warning)("no").to_string()
        }
    }
}
