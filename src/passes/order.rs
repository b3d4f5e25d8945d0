//! Sequence numbers for command containers.
//!
//! Every item of a generated container gets `<Order>n</Order>` as its first
//! child (1..N in document order) and `wcm:action="add"`. Caller-supplied
//! subtrees keep whatever ordering the caller wrote, and attached payloads
//! under `Extensions` are file content, not settings.

use crate::command::target::item_name_for;
use crate::document::{Element, EXTENSIONS_NS};
use crate::error::{Error, Result};

use super::{Pass, PassContext};

pub struct Order;

impl Pass for Order {
    fn name(&self) -> &str {
        "order"
    }

    fn apply(&self, ctx: &mut PassContext<'_>) -> Result<()> {
        // A statement that arrives after its flush would never run.
        ctx.buffers.ensure_drained()?;
        number_containers(ctx.document.root_mut())
    }
}

fn number_containers(element: &mut Element) -> Result<()> {
    if element.is_verbatim() || element.namespace() == Some(EXTENSIONS_NS) {
        return Ok(());
    }
    if let Some(item) = item_name_for(element.local_name()) {
        return number_items(element, item);
    }
    for child in element.elements_mut() {
        number_containers(child)?;
    }
    Ok(())
}

fn number_items(container: &mut Element, item: &str) -> Result<()> {
    let container_name = container.local_name().to_string();
    for (index, node) in container
        .elements_mut()
        .filter(|e| e.local_name() == item)
        .enumerate()
    {
        if node.child("Order").is_some() {
            return Err(Error::defect(format!(
                "{container_name} item {} already carries an Order",
                index + 1
            )));
        }
        node.prepend(Element::new("Order").with_text((index + 1).to_string()));
        node.set_attr("wcm:action", "add");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffers::{BufferKind, ScriptBuffers};
    use crate::command::target;
    use crate::document::{AnswerDocument, Architecture};
    use crate::extensions;
    use crate::phase::Phase;
    use crate::settings::Configuration;

    fn drained() -> ScriptBuffers {
        let mut buffers = ScriptBuffers::new();
        for kind in BufferKind::ALL {
            buffers.get_mut(kind).drain().unwrap();
        }
        buffers
    }

    fn order(document: &mut AnswerDocument, buffers: &mut ScriptBuffers) -> Result<()> {
        let config = Configuration::default();
        Order.apply(&mut PassContext {
            config: &config,
            document,
            buffers,
        })
    }

    fn orders(item_parent: &Element) -> Vec<String> {
        item_parent
            .elements()
            .map(|item| {
                let first = item.elements().next().unwrap();
                assert_eq!(first.local_name(), "Order");
                assert_eq!(item.attr("wcm:action"), Some("add"));
                first.text()
            })
            .collect()
    }

    #[test]
    fn test_each_container_numbered_from_one() {
        let mut doc = AnswerDocument::from_template(Architecture::Amd64).unwrap();
        target(&mut doc, Phase::Specialize).unwrap().append_all(["a", "b", "c"]);
        target(&mut doc, Phase::WindowsPe).unwrap().append("pe");
        target(&mut doc, Phase::OobeSystem).unwrap().append_all(["x", "y"]);
        order(&mut doc, &mut drained()).unwrap();

        let specialize = doc
            .component(Phase::Specialize, "Microsoft-Windows-Deployment")
            .and_then(|c| c.child("RunSynchronous"))
            .unwrap();
        assert_eq!(orders(specialize), vec!["1", "2", "3"]);
        let paths: Vec<_> = specialize
            .elements()
            .map(|item| item.child("Path").unwrap().text())
            .collect();
        assert_eq!(paths, vec!["a", "b", "c"]);

        let pe = doc
            .component(Phase::WindowsPe, "Microsoft-Windows-Setup")
            .and_then(|c| c.child("RunSynchronous"))
            .unwrap();
        assert_eq!(orders(pe), vec!["1"]);

        let oobe = doc
            .component(Phase::OobeSystem, "Microsoft-Windows-Shell-Setup")
            .and_then(|c| c.child("FirstLogonCommands"))
            .unwrap();
        assert_eq!(orders(oobe), vec!["1", "2"]);
    }

    #[test]
    fn test_existing_order_is_a_defect() {
        let mut doc = AnswerDocument::from_template(Architecture::Amd64).unwrap();
        target(&mut doc, Phase::Specialize).unwrap().append("a");
        let mut buffers = drained();
        order(&mut doc, &mut buffers).unwrap();
        let err = order(&mut doc, &mut buffers).unwrap_err();
        assert!(matches!(err, Error::Defect(_)));
    }

    #[test]
    fn test_verbatim_container_untouched() {
        let mut doc = AnswerDocument::from_template(Architecture::Amd64).unwrap();
        let custom = Element::parse(
            r#"<component name="Microsoft-Windows-Deployment"><RunSynchronous><RunSynchronousCommand><Order>5</Order><Path>x</Path></RunSynchronousCommand><RunSynchronousCommand><Path>y</Path></RunSynchronousCommand></RunSynchronous></component>"#,
        )
        .unwrap();
        doc.insert_verbatim_component(Phase::Specialize, custom).unwrap();
        let before = doc.to_canonical_string();
        order(&mut doc, &mut drained()).unwrap();
        assert_eq!(doc.to_canonical_string(), before);
    }

    #[test]
    fn test_undrained_buffers_are_a_defect() {
        let mut doc = AnswerDocument::from_template(Architecture::Amd64).unwrap();
        let err = order(&mut doc, &mut ScriptBuffers::new()).unwrap_err();
        assert!(matches!(err, Error::Defect(_)));
    }

    #[test]
    fn test_attached_payload_keeps_its_commands_unnumbered() {
        let mut doc = AnswerDocument::from_template(Architecture::Amd64).unwrap();
        let payload = Element::parse(
            "<Inner><FirstLogonCommands><SynchronousCommand><CommandLine>inner.exe</CommandLine></SynchronousCommand></FirstLogonCommands></Inner>",
        )
        .unwrap();
        extensions::attach_xml(&mut doc, r"C:\inner.xml", payload).unwrap();
        target(&mut doc, Phase::OobeSystem).unwrap().append("outer.exe");
        order(&mut doc, &mut drained()).unwrap();

        let inner = doc
            .root()
            .child("Extensions")
            .and_then(|ext| ext.elements().find(|e| e.local_name() == "File"))
            .and_then(|file| file.descend(&["Inner", "FirstLogonCommands", "SynchronousCommand"]))
            .unwrap();
        assert_eq!(inner.attr("wcm:action"), None);
        assert!(inner.child("Order").is_none());

        let oobe = doc
            .component(Phase::OobeSystem, "Microsoft-Windows-Shell-Setup")
            .and_then(|c| c.child("FirstLogonCommands"))
            .unwrap();
        assert_eq!(orders(oobe), vec!["1"]);
    }
}
