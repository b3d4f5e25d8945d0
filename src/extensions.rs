//! Embedded files carried inside the answer document itself.
//!
//! Payloads are attached as `File` elements (with a `path` attribute) under
//! an `Extensions` element in a private namespace. The first attachment
//! also adds an `ExtractScript` and one specialize-phase command that loads
//! the deployed copy of this very document and runs that script, which
//! writes every `File` back to disk.
//!
//! XML payloads are attached as child elements so the extraction script can
//! tell them apart from plain text.

use tracing::debug;

use crate::command::{self, target};
use crate::document::{AnswerDocument, Element, EXTENSIONS_NS};
use crate::error::{Error, Result};
use crate::phase::Phase;

/// Where setup leaves the answer file it was started with.
pub const DEPLOYED_ANSWER_FILE: &str = r"C:\Windows\Panther\unattend.xml";

const EXTRACT_SCRIPT: &str = r#"param(
	[xml] $Document
);

foreach( $file in $Document.unattend.Extensions.File ) {
	$path = [System.Environment]::ExpandEnvironmentVariables( $file.GetAttribute( 'path' ) );
	New-Item -ItemType 'Directory' -Path ( Split-Path -Path $path -Parent ) -Force | Out-Null;
	if( $file.FirstChild -is [System.Xml.XmlElement] ) {
		$content = $file.InnerXml;
		$encoding = [System.Text.UTF8Encoding]::new( $true );
	} else {
		$content = $file.InnerText.Trim();
		$encoding = switch( [System.IO.Path]::GetExtension( $path ) ) {
			{ $_ -in '.reg', '.vbs', '.js' } { [System.Text.UnicodeEncoding]::new( $false, $true ); }
			{ $_ -in '.ps1', '.xml' } { [System.Text.UTF8Encoding]::new( $true ); }
			default { [System.Text.Encoding]::Default; }
		};
	}
	$content = $content -replace "`r?`n", "`r`n";
	[System.IO.File]::WriteAllBytes( $path, ( $encoding.GetPreamble() + $encoding.GetBytes( $content ) ) );
}"#;

/// Attach a text file.
pub fn attach_text(document: &mut AnswerDocument, path: &str, text: &str) -> Result<()> {
    attach(document, path, |file| {
        file.set_text(text);
    })
}

/// Attach an XML file; `content` becomes the `File` element's only child.
pub fn attach_xml(document: &mut AnswerDocument, path: &str, content: Element) -> Result<()> {
    attach(document, path, |file| {
        file.push(content);
    })
}

/// Paths of every attached file, in attachment order.
pub fn attached_paths(document: &AnswerDocument) -> Vec<String> {
    document
        .root()
        .child("Extensions")
        .map(|extensions| {
            extensions
                .elements()
                .filter(|e| e.local_name() == "File")
                .filter_map(|e| e.attr("path"))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn attach(
    document: &mut AnswerDocument,
    path: &str,
    fill: impl FnOnce(&mut Element),
) -> Result<()> {
    if path.trim().is_empty() {
        return Err(Error::config("embedded file path must not be empty"));
    }
    if attached_paths(document)
        .iter()
        .any(|existing| existing.eq_ignore_ascii_case(path))
    {
        return Err(Error::config(format!(
            "embedded file '{path}' is attached more than once"
        )));
    }

    let first_use = ensure_extract_script(document);
    let mut file = Element::new("File").with_attr("path", path);
    fill(&mut file);
    extensions_mut(document).push(file);
    debug!(path, "attached embedded file");

    if first_use {
        target(document, Phase::Specialize)?.append(bootstrap_command());
    }
    Ok(())
}

/// Returns true when the script was added by this call.
fn ensure_extract_script(document: &mut AnswerDocument) -> bool {
    let extensions = extensions_mut(document);
    if extensions.child("ExtractScript").is_some() {
        return false;
    }
    extensions.prepend(Element::new("ExtractScript").with_text(EXTRACT_SCRIPT));
    true
}

fn extensions_mut(document: &mut AnswerDocument) -> &mut Element {
    document.root_mut().child_or_insert_with(
        |e| e.local_name() == "Extensions" && e.namespace() == Some(EXTENSIONS_NS),
        || Element::in_namespace("Extensions", EXTENSIONS_NS).with_attr("xmlns", EXTENSIONS_NS),
    )
}

fn bootstrap_command() -> String {
    command::powershell_command(&format!(
        "$xml = [xml]::new(); $xml.Load({}); $sb = [scriptblock]::Create( $xml.unattend.Extensions.ExtractScript ); Invoke-Command -ScriptBlock $sb -ArgumentList $xml;",
        command::ps_literal(DEPLOYED_ANSWER_FILE)
    ))
}
