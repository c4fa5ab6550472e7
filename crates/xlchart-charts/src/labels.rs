//! Data labels: `c:dLbls` on a group or series, and per-point `c:dLbl` overrides.
//!
//! `CT_DLbls` and `CT_DLbl` require the full `show*` flag sequence, so the first write to a label
//! element creates it with every flag switched off before applying the change.

use std::ops::{Deref, DerefMut};

use xlchart_dom::{ElementPath, Leaf, Step, XmlDocument, XmlNode};

use crate::enums::DataLabelPosition;
use crate::error::ChartError;
use crate::groups::owning_group_type;
use crate::property::{node_wrapper, path_key, BoolProp, EnumProp, Node, TextProp, ValProp};

node_wrapper! {
    /// `c:dLbls` of a chart group or series.
    DataLabels
}

node_wrapper! {
    /// `c:dLbl` children of a `c:dLbls`, keyed by point index.
    DataLabelOverrides
}

node_wrapper! {
    /// Label override for a single data point.
    DataLabel
}

const SHOW_FLAGS: [&str; 6] = [
    "showLegendKey",
    "showVal",
    "showCatName",
    "showSerName",
    "showPercent",
    "showBubbleSize",
];

const DELETE: BoolProp = ValProp::new("delete", &[Step::c("delete")]);
const FORMAT_CODE: TextProp = ValProp::attr("label number format", &[Step::c("numFmt")], "formatCode");
const SOURCE_LINKED: BoolProp = ValProp::attr("source linked", &[Step::c("numFmt")], "sourceLinked");
const POSITION: EnumProp<DataLabelPosition> = ValProp::new("label position", &[Step::c("dLblPos")]);
const SHOW_LEGEND_KEY: BoolProp = ValProp::new("show legend key", &[Step::c("showLegendKey")]);
const SHOW_VALUE: BoolProp = ValProp::new("show value", &[Step::c("showVal")]);
const SHOW_CATEGORY: BoolProp = ValProp::new("show category name", &[Step::c("showCatName")]);
const SHOW_SERIES: BoolProp = ValProp::new("show series name", &[Step::c("showSerName")]);
const SHOW_PERCENT: BoolProp = ValProp::new("show percent", &[Step::c("showPercent")]);
const SHOW_BUBBLE_SIZE: BoolProp = ValProp::new("show bubble size", &[Step::c("showBubbleSize")]);
const SEPARATOR: TextProp = ValProp::text("separator", &[Step::c("separator")]);
const SHOW_LEADER_LINES: BoolProp = ValProp::new("show leader lines", &[Step::c("showLeaderLines")]);
const LABEL: Step = Step::c("dLbl");

/// Clears `delete` and fills in missing `show*` flags as off.
fn initialize<D: DerefMut<Target = XmlDocument>>(node: &mut Node<D>) -> Result<(), ChartError> {
    node.remove_at(DELETE.steps);
    for flag in SHOW_FLAGS {
        let path = node.path().child(Step::c(flag));
        if !node.doc().exists(&path) {
            node.doc_mut().set(&path, Leaf::VAL, "0")?;
        }
    }
    Ok(())
}

fn check_position(doc: &XmlDocument, path: &ElementPath) -> Result<(), ChartError> {
    match owning_group_type(doc, path) {
        Some(chart_type) if !chart_type.capabilities().has_data_label_position => Err(ChartError::Unsupported {
            feature: "data label position",
            chart_type,
        }),
        _ => Ok(()),
    }
}

macro_rules! label_options {
    ($name:ident) => {
        impl<D: Deref<Target = XmlDocument>> $name<D> {
            pub fn show_legend_key(&self) -> bool {
                self.node.get(&SHOW_LEGEND_KEY).unwrap_or(false)
            }

            pub fn show_value(&self) -> bool {
                self.node.get(&SHOW_VALUE).unwrap_or(false)
            }

            pub fn show_category_name(&self) -> bool {
                self.node.get(&SHOW_CATEGORY).unwrap_or(false)
            }

            pub fn show_series_name(&self) -> bool {
                self.node.get(&SHOW_SERIES).unwrap_or(false)
            }

            pub fn show_percent(&self) -> bool {
                self.node.get(&SHOW_PERCENT).unwrap_or(false)
            }

            pub fn show_bubble_size(&self) -> bool {
                self.node.get(&SHOW_BUBBLE_SIZE).unwrap_or(false)
            }

            pub fn separator(&self) -> Option<String> {
                self.node.get(&SEPARATOR)
            }

            pub fn number_format(&self) -> Option<String> {
                self.node.get(&FORMAT_CODE)
            }

            /// Whether the number format follows the source cells.
            pub fn source_linked(&self) -> bool {
                self.node.get(&SOURCE_LINKED).unwrap_or(false)
            }

            /// `None` when the application picks the placement.
            pub fn position(&self) -> Option<DataLabelPosition> {
                self.node.get(&POSITION)
            }

            pub fn deleted(&self) -> bool {
                self.node.get(&DELETE).unwrap_or(false)
            }
        }

        impl<D: DerefMut<Target = XmlDocument>> $name<D> {
            fn set_flag(&mut self, prop: &BoolProp, value: bool) -> Result<(), ChartError> {
                initialize(&mut self.node)?;
                self.node.set(prop, value)
            }

            pub fn set_show_legend_key(&mut self, show: bool) -> Result<(), ChartError> {
                self.set_flag(&SHOW_LEGEND_KEY, show)
            }

            pub fn set_show_value(&mut self, show: bool) -> Result<(), ChartError> {
                self.set_flag(&SHOW_VALUE, show)
            }

            pub fn set_show_category_name(&mut self, show: bool) -> Result<(), ChartError> {
                self.set_flag(&SHOW_CATEGORY, show)
            }

            pub fn set_show_series_name(&mut self, show: bool) -> Result<(), ChartError> {
                self.set_flag(&SHOW_SERIES, show)
            }

            pub fn set_show_percent(&mut self, show: bool) -> Result<(), ChartError> {
                self.set_flag(&SHOW_PERCENT, show)
            }

            pub fn set_show_bubble_size(&mut self, show: bool) -> Result<(), ChartError> {
                self.set_flag(&SHOW_BUBBLE_SIZE, show)
            }

            pub fn set_separator(&mut self, separator: Option<&str>) -> Result<(), ChartError> {
                initialize(&mut self.node)?;
                self.node.set_opt(&SEPARATOR, separator.map(str::to_string))
            }

            /// Sets an explicit format code, which unlinks it from the source cells.
            pub fn set_number_format(&mut self, format_code: &str) -> Result<(), ChartError> {
                initialize(&mut self.node)?;
                self.node.set(&FORMAT_CODE, format_code.to_string())?;
                self.node.set(&SOURCE_LINKED, false)
            }

            pub fn set_position(&mut self, position: Option<DataLabelPosition>) -> Result<(), ChartError> {
                if position.is_some() {
                    check_position(self.node.doc(), self.node.path())?;
                }
                initialize(&mut self.node)?;
                self.node.set_opt(&POSITION, position)
            }

            /// Deleting drops every other option of the label.
            pub fn set_deleted(&mut self, deleted: bool) -> Result<(), ChartError> {
                if !deleted {
                    return initialize(&mut self.node);
                }
                let keep = ["idx", "dLbl"];
                self.node.ensure()?.children.retain(|child| match child {
                    XmlNode::Element(el) => keep.contains(&el.name.local.as_str()),
                    XmlNode::Text(_) => false,
                });
                self.node.set(&DELETE, true)
            }
        }
    };
}

label_options!(DataLabels);
label_options!(DataLabel);

impl<D: Deref<Target = XmlDocument>> DataLabels<D> {
    pub fn show_leader_lines(&self) -> bool {
        self.node.get(&SHOW_LEADER_LINES).unwrap_or(false)
    }

    pub fn overrides(&self) -> DataLabelOverrides<&XmlDocument> {
        DataLabelOverrides::from_node(self.node.view())
    }
}

impl<D: DerefMut<Target = XmlDocument>> DataLabels<D> {
    pub fn set_show_leader_lines(&mut self, show: bool) -> Result<(), ChartError> {
        initialize(&mut self.node)?;
        self.node.set(&SHOW_LEADER_LINES, show)
    }

    pub fn overrides_mut(&mut self) -> DataLabelOverrides<&mut XmlDocument> {
        DataLabelOverrides::from_node(self.node.view_mut())
    }

    /// Removes the labels element with its overrides.
    pub fn remove(&mut self) -> bool {
        self.node.remove().is_some()
    }
}

impl<D: Deref<Target = XmlDocument>> DataLabelOverrides<D> {
    pub fn indices(&self) -> Vec<u32> {
        self.node.keys(LABEL, "idx")
    }

    pub fn len(&self) -> usize {
        self.indices().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, idx: u32) -> Option<DataLabel<&XmlDocument>> {
        let label = DataLabel::from_node(self.node.child(&[LABEL.keyed("idx", idx)]));
        label.exists().then_some(label)
    }
}

impl<D: DerefMut<Target = XmlDocument>> DataLabelOverrides<D> {
    pub fn get_mut(&mut self, idx: u32) -> Option<DataLabel<&mut XmlDocument>> {
        let node = self.node.child_mut(&[LABEL.keyed("idx", idx)]);
        node.exists().then(|| DataLabel::from_node(node))
    }

    /// Adds an override for point `idx` with every label part hidden.
    pub fn add(&mut self, idx: u32) -> Result<DataLabel<&mut XmlDocument>, ChartError> {
        initialize(&mut self.node)?;
        let path = self.node.add_keyed("data label overrides", LABEL, "idx", idx)?;
        let mut node = Node::new(self.node.doc_mut(), path);
        initialize(&mut node)?;
        Ok(DataLabel::from_node(node))
    }

    pub fn remove(&mut self, idx: u32) -> bool {
        self.node.remove_at(&[LABEL.keyed("idx", idx)]).is_some()
    }
}

impl<D: Deref<Target = XmlDocument>> DataLabel<D> {
    pub fn idx(&self) -> Option<u32> {
        path_key(self.path())
    }
}
