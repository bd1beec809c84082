//! Data styles (number formats)

use crate::error::Result;
use crate::fast_writer::xml_writer::XmlWriter;
use crate::types::ValueType;
use std::io::Write;
use std::sync::Arc;

/// Format of a data style
#[derive(Debug, Clone, PartialEq)]
pub enum DataStyleKind {
    Boolean,
    Float { decimal_places: u8, grouping: bool },
    Percentage { decimal_places: u8 },
    Currency { symbol: String, decimal_places: u8 },
    Date,
    Time,
}

/// A `<number:*-style>` element referenced by cell styles through `style:data-style-name`
#[derive(Debug, Clone, PartialEq)]
pub struct DataStyle {
    name: String,
    hidden: bool,
    language: String,
    country: String,
    kind: DataStyleKind,
}

impl DataStyle {
    pub fn new(name: &str, kind: DataStyleKind) -> Self {
        DataStyle {
            name: name.to_string(),
            hidden: false,
            language: "en".to_string(),
            country: "US".to_string(),
            kind,
        }
    }

    pub fn with_hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn with_locale(mut self, language: &str, country: &str) -> Self {
        self.language = language.to_string();
        self.country = country.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn kind(&self) -> &DataStyleKind {
        &self.kind
    }

    fn element_name(&self) -> &'static str {
        match self.kind {
            DataStyleKind::Boolean => "number:boolean-style",
            DataStyleKind::Float { .. } => "number:number-style",
            DataStyleKind::Percentage { .. } => "number:percentage-style",
            DataStyleKind::Currency { .. } => "number:currency-style",
            DataStyleKind::Date => "number:date-style",
            DataStyleKind::Time => "number:time-style",
        }
    }

    pub fn append_xml<W: Write>(&self, xml: &mut XmlWriter<W>) -> Result<()> {
        let element = self.element_name();
        xml.start_element(element)?;
        xml.attribute("style:name", &self.name)?;
        xml.attribute("number:language", &self.language)?;
        xml.attribute("number:country", &self.country)?;
        xml.attribute_raw("style:volatile", "true")?;
        if self.kind == DataStyleKind::Time {
            xml.attribute_raw("number:truncate-on-overflow", "false")?;
        }
        xml.close_start_tag()?;

        match &self.kind {
            DataStyleKind::Boolean => xml.empty_element("number:boolean")?,
            DataStyleKind::Float {
                decimal_places,
                grouping,
            } => Self::append_number(xml, *decimal_places, *grouping)?,
            DataStyleKind::Percentage { decimal_places } => {
                Self::append_number(xml, *decimal_places, false)?;
                xml.text_element("number:text", "%")?;
            }
            DataStyleKind::Currency {
                symbol,
                decimal_places,
            } => {
                Self::append_number(xml, *decimal_places, true)?;
                xml.text_element("number:text", " ")?;
                xml.text_element("number:currency-symbol", symbol)?;
            }
            DataStyleKind::Date => {
                Self::append_long(xml, "number:year")?;
                xml.text_element("number:text", "-")?;
                Self::append_long(xml, "number:month")?;
                xml.text_element("number:text", "-")?;
                Self::append_long(xml, "number:day")?;
            }
            DataStyleKind::Time => {
                Self::append_long(xml, "number:hours")?;
                xml.text_element("number:text", ":")?;
                Self::append_long(xml, "number:minutes")?;
                xml.text_element("number:text", ":")?;
                Self::append_long(xml, "number:seconds")?;
            }
        }

        xml.end_element(element)
    }

    fn append_number<W: Write>(
        xml: &mut XmlWriter<W>,
        decimal_places: u8,
        grouping: bool,
    ) -> Result<()> {
        xml.start_element("number:number")?;
        xml.attribute_int("number:decimal-places", decimal_places as i64)?;
        xml.attribute_int("number:min-decimal-places", decimal_places as i64)?;
        xml.attribute_int("number:min-integer-digits", 1)?;
        if grouping {
            xml.attribute_raw("number:grouping", "true")?;
        }
        xml.end_empty()
    }

    fn append_long<W: Write>(xml: &mut XmlWriter<W>, element: &str) -> Result<()> {
        xml.start_element(element)?;
        xml.attribute_raw("number:style", "long")?;
        xml.end_empty()
    }
}

/// Data styles applied implicitly to typed cell values
#[derive(Debug, Clone)]
pub struct DataStyles {
    boolean: Arc<DataStyle>,
    float: Arc<DataStyle>,
    percentage: Arc<DataStyle>,
    currency: Arc<DataStyle>,
    date: Arc<DataStyle>,
    time: Arc<DataStyle>,
}

impl Default for DataStyles {
    fn default() -> Self {
        DataStyles {
            boolean: Arc::new(DataStyle::new("boolean-data", DataStyleKind::Boolean)),
            float: Arc::new(DataStyle::new(
                "float-data",
                DataStyleKind::Float {
                    decimal_places: 2,
                    grouping: false,
                },
            )),
            percentage: Arc::new(DataStyle::new(
                "percentage-data",
                DataStyleKind::Percentage { decimal_places: 2 },
            )),
            currency: Arc::new(DataStyle::new(
                "currency-data",
                DataStyleKind::Currency {
                    symbol: "€".to_string(),
                    decimal_places: 2,
                },
            )),
            date: Arc::new(DataStyle::new("date-data", DataStyleKind::Date)),
            time: Arc::new(DataStyle::new("time-data", DataStyleKind::Time)),
        }
    }
}

impl DataStyles {
    pub fn with_float(mut self, style: DataStyle) -> Self {
        self.float = Arc::new(style);
        self
    }

    pub fn with_currency(mut self, style: DataStyle) -> Self {
        self.currency = Arc::new(style);
        self
    }

    pub fn with_date(mut self, style: DataStyle) -> Self {
        self.date = Arc::new(style);
        self
    }

    pub fn boolean(&self) -> &Arc<DataStyle> {
        &self.boolean
    }

    pub fn float(&self) -> &Arc<DataStyle> {
        &self.float
    }

    pub fn percentage(&self) -> &Arc<DataStyle> {
        &self.percentage
    }

    pub fn currency(&self) -> &Arc<DataStyle> {
        &self.currency
    }

    pub fn date(&self) -> &Arc<DataStyle> {
        &self.date
    }

    pub fn time(&self) -> &Arc<DataStyle> {
        &self.time
    }

    /// Data style implied by a value type; strings and voids have none
    pub fn for_value_type(&self, value_type: ValueType) -> Option<&Arc<DataStyle>> {
        match value_type {
            ValueType::Boolean => Some(&self.boolean),
            ValueType::Float => Some(&self.float),
            ValueType::Percentage => Some(&self.percentage),
            ValueType::Currency => Some(&self.currency),
            ValueType::Date => Some(&self.date),
            ValueType::Time => Some(&self.time),
            ValueType::String | ValueType::Void => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<DataStyle>> {
        [
            &self.boolean,
            &self.float,
            &self.percentage,
            &self.currency,
            &self.date,
            &self.time,
        ]
        .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(style: &DataStyle) -> String {
        let mut output = Vec::new();
        let mut xml = XmlWriter::new(&mut output);
        style.append_xml(&mut xml).unwrap();
        xml.flush().unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_boolean_style() {
        let styles = DataStyles::default();
        assert_eq!(
            render(styles.boolean()),
            "<number:boolean-style style:name=\"boolean-data\" number:language=\"en\" number:country=\"US\" style:volatile=\"true\"><number:boolean/></number:boolean-style>"
        );
    }

    #[test]
    fn test_percentage_style() {
        let style = DataStyle::new("pct", DataStyleKind::Percentage { decimal_places: 1 })
            .with_locale("fr", "FR");
        let xml = render(&style);
        assert!(xml.contains("number:language=\"fr\""));
        assert!(xml.contains("<number:number number:decimal-places=\"1\""));
        assert!(xml.ends_with("<number:text>%</number:text></number:percentage-style>"));
    }

    #[test]
    fn test_for_value_type() {
        let styles = DataStyles::default();
        assert_eq!(
            styles.for_value_type(ValueType::Date).unwrap().name(),
            "date-data"
        );
        assert!(styles.for_value_type(ValueType::String).is_none());
        assert_eq!(styles.iter().count(), 6);
    }
}
