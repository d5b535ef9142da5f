//! Homebrew formula template.

use minijinja::Environment;
use serde::Serialize;

/// Name the formula template is registered under.
const TEMPLATE_NAME: &str = "formula.rb";

/// Fixed formula layout. Every platform block is always rendered, with
/// blank URL and checksum when the slot has no archive.
pub const FORMULA_TEMPLATE: &str = r#"# typed: strict
# frozen_string_literal: true

# {{ class_name }} formula
class {{ class_name }} < Formula
  version "{{ version }}"

  on_macos do
    if Hardware::CPU.arm?
      url "{{ darwin_arm64.url }}"
      sha256 "{{ darwin_arm64.sha256 }}"
    else
      url "{{ darwin_amd64.url }}"
      sha256 "{{ darwin_amd64.sha256 }}"
    end
  end

  on_linux do
    if Hardware::CPU.arm?
      url "{{ linux_arm64.url }}"
      sha256 "{{ linux_arm64.sha256 }}"
    else
      url "{{ linux_amd64.url }}"
      sha256 "{{ linux_amd64.sha256 }}"
    end
  end

  def install
    bin.install "{{ module_name }}"
  end
end
"#;

/// URL and checksum for one template slot; both empty when unpopulated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormulaSlot {
    /// Archive download URL.
    pub url: String,
    /// Lowercase hex SHA-256 of the archive.
    pub sha256: String,
}

/// Values substituted into [`FORMULA_TEMPLATE`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormulaContext {
    /// Ruby class name derived from the module name.
    pub class_name: String,
    /// Version without a leading `v`.
    pub version: String,
    /// Binary name installed by the formula.
    pub module_name: String,
    /// macOS on Intel.
    pub darwin_amd64: FormulaSlot,
    /// macOS on Apple silicon.
    pub darwin_arm64: FormulaSlot,
    /// Linux on x86-64.
    pub linux_amd64: FormulaSlot,
    /// Linux on ARM64.
    pub linux_arm64: FormulaSlot,
}

/// Renders the formula for `context`.
///
/// # Errors
///
/// Returns a [`minijinja::Error`] if the template fails to render.
pub fn render_formula(context: &FormulaContext) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.add_template(TEMPLATE_NAME, FORMULA_TEMPLATE)?;
    env.get_template(TEMPLATE_NAME)?.render(context)
}
