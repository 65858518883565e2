//! OMNeT++/INET export.
//!
//! Emits a NED network with one `InetNode` per leaf and an `omnetpp.ini`
//! section configuring a TCP sink plus one sender per outgoing edge on each
//! leaf. A pair of opposite edges becomes a single duplex Ethernet channel.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::io::Write;

use log::warn;

use crate::model::Identified;
use crate::topology::types::{Bandwidth, Leaf, Node};

/// Standard INET Ethernet channels and their rates
const ETHERNET_CHANNELS: [(Bandwidth, &str); 8] = [
    (10_000_000, "Eth10M"),
    (100_000_000, "Eth100M"),
    (1_000_000_000, "Eth1G"),
    (10_000_000_000, "Eth10G"),
    (40_000_000_000, "Eth40G"),
    (100_000_000_000, "Eth100G"),
    (200_000_000_000, "Eth200G"),
    (400_000_000_000, "Eth400G"),
];

const INDENT: &str = "    ";

/// Submodules every exported network declares besides the leaves
const RESERVED_NAMES: [&str; 3] = ["configurator", "entry", "exit"];

/// Channel whose rate is closest to `bandwidth`; ties go to the faster one
pub fn ethernet_channel(bandwidth: Bandwidth) -> &'static str {
    ETHERNET_CHANNELS
        .iter()
        .rev()
        .min_by_key(|(rate, _)| rate.abs_diff(bandwidth))
        .map_or("Eth10M", |(_, name)| *name)
}

/// NED identifiers only allow letters, digits and underscores
pub fn ned_identifier(id: &str) -> String {
    let mut identifier: String = id
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '_' { ch } else { '_' })
        .collect();
    if !identifier.starts_with(|ch: char| ch.is_ascii_alphabetic() || ch == '_') {
        identifier.insert(0, '_');
    }
    identifier
}

/// Unique NED submodule name per leaf id.
///
/// Ids that sanitise to a name already taken get the first free `_N` suffix,
/// in leaf order.
pub fn submodule_names<'a>(leaves: &[&'a Leaf]) -> HashMap<&'a str, String> {
    let mut taken: HashSet<String> = RESERVED_NAMES.iter().map(|name| name.to_string()).collect();
    let mut names = HashMap::new();

    for &leaf in leaves {
        if names.contains_key(leaf.id()) {
            continue;
        }
        let base = ned_identifier(leaf.id());
        let mut name = base.clone();
        let mut suffix = 1;
        while taken.contains(&name) {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        if name != base {
            warn!("NED name '{}' is taken, leaf '{}' is exported as '{}'", base, leaf.id(), name);
        }
        taken.insert(name.clone());
        names.insert(leaf.id(), name);
    }
    names
}

/// Submodule name of a leaf id, sanitised directly when it is not a known leaf
fn submodule<'n>(names: &'n HashMap<&str, String>, id: &str) -> Cow<'n, str> {
    match names.get(id) {
        Some(name) => Cow::Borrowed(name.as_str()),
        None => Cow::Owned(ned_identifier(id)),
    }
}

pub fn write_topology<W: Write + ?Sized>(node: &Node, writer: &mut W) -> std::io::Result<()> {
    let leaves = node.flatten();
    let names = submodule_names(&leaves);
    let network = ned_identifier(node.id());

    write_ned(&network, &leaves, &names, writer)?;
    writeln!(writer)?;
    write_ini(&network, &leaves, &names, writer)
}

fn write_ned<W: Write + ?Sized>(
    network: &str,
    leaves: &[&Leaf],
    names: &HashMap<&str, String>,
    writer: &mut W,
) -> std::io::Result<()> {
    writeln!(writer, "import inet.networklayer.configurator.ipv4.Ipv4NetworkConfigurator;")?;
    for (_, channel) in ETHERNET_CHANNELS.iter().rev() {
        writeln!(writer, "import inet.node.ethernet.{};", channel)?;
    }
    writeln!(writer, "import nsim.NetworkEntryPoint;")?;
    writeln!(writer, "import nsim.NetworkExitPoint;")?;
    writeln!(writer, "import nsim.nodes.InetNode;")?;
    writeln!(writer)?;

    writeln!(writer, "network {}", network)?;
    writeln!(writer, "{{")?;
    writeln!(writer, "{}submodules:", INDENT)?;
    writeln!(writer, "{0}{0}configurator: Ipv4NetworkConfigurator {{", INDENT)?;
    writeln!(writer, "{0}{0}{0}@display(\"p=389,47\");", INDENT)?;
    writeln!(writer, "{0}{0}}}", INDENT)?;
    writeln!(writer, "{0}{0}entry: NetworkEntryPoint;", INDENT)?;
    writeln!(writer, "{0}{0}exit: NetworkExitPoint;", INDENT)?;
    for leaf in leaves {
        writeln!(writer, "{0}{0}{1}: InetNode;", INDENT, submodule(names, leaf.id()))?;
    }

    writeln!(writer, "{}connections:", INDENT)?;
    for leaf in leaves {
        writeln!(writer, "{0}{0}entry.out++ --> {1}.in;", INDENT, submodule(names, leaf.id()))?;
    }
    writeln!(writer)?;
    for leaf in leaves {
        writeln!(writer, "{0}{0}{1}.out --> exit.in++;", INDENT, submodule(names, leaf.id()))?;
    }
    writeln!(writer)?;

    // Opposite edges share one duplex channel, sized by the first one seen
    let mut linked: HashSet<(&str, &str)> = HashSet::new();
    for leaf in leaves {
        for edge in leaf.edges() {
            if linked.contains(&(edge.source(), edge.destination())) {
                continue;
            }
            linked.insert((edge.destination(), edge.source()));
            writeln!(
                writer,
                "{0}{0}{1}.ethg++ <--> {2} <--> {3}.ethg++;",
                INDENT,
                submodule(names, edge.source()),
                ethernet_channel(edge.bandwidth()),
                submodule(names, edge.destination())
            )?;
        }
    }
    writeln!(writer, "}}")
}

fn write_ini<W: Write + ?Sized>(
    network: &str,
    leaves: &[&Leaf],
    names: &HashMap<&str, String>,
    writer: &mut W,
) -> std::io::Result<()> {
    writeln!(writer, "[Config {}]", network)?;
    writeln!(writer, "network = {}", network)?;

    for leaf in leaves {
        let name = submodule(names, leaf.id());
        writeln!(writer)?;
        writeln!(writer, "**.{}.numApps = {}", name, leaf.edges().len() + 1)?;
        writeln!(writer, "**.{}.app[0].typename = \"TcpSinkApp\"", name)?;

        for (index, edge) in leaf.edges().iter().enumerate() {
            let prefix = format!("**.{}.app[{}]", name, index + 1);
            writeln!(writer, "{}.typename = \"InetSendApp\"", prefix)?;
            writeln!(writer, "{}.localAddress = \"{}\"", prefix, name)?;
            writeln!(
                writer,
                "{}.connectAddress = \"{}\"",
                prefix,
                submodule(names, edge.destination())
            )?;
        }
    }
    Ok(())
}
