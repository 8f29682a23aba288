//! Shared fixture: a small platform library plus the serguard annotations.

#![allow(dead_code)]

use serguard_analysis::{build_policy, AllowList, DeserializabilityPolicy, Predicates};
use serguard_core::config::AnnotationConfig;
use serguard_core::model::{Annotation, Location, ModelBuilder, Origin, SpecialType, TypeKind};
use serguard_core::{SymbolId, TypeId, TypeModel};

/// Handles of the types every fixture declares.
#[derive(Debug, Clone, Copy)]
pub struct Known {
    pub marker: TypeId,
    pub pinned: TypeId,
    pub structural: TypeId,
    pub custom: TypeId,
    pub ignore: TypeId,
    pub object: TypeId,
    pub string: TypeId,
    pub int32: TypeId,
    pub nullable: TypeId,
    pub list: TypeId,
    pub key_value_pair: TypeId,
    pub dictionary: TypeId,
}

pub struct Fixture {
    pub b: ModelBuilder,
    pub k: Known,
}

impl Fixture {
    pub fn new() -> Self {
        let mut b = ModelBuilder::new();
        let attribute = |b: &mut ModelBuilder, name: &str| {
            b.declare_type(name, TypeKind::Class, Origin::Metadata).unwrap()
        };
        let marker = attribute(&mut b, "Serguard.Annotations.RequiresDeserializableAttribute");
        let pinned = attribute(&mut b, "Serguard.Annotations.RequiresPinnedAttribute");
        let structural = attribute(&mut b, "Serguard.Annotations.DeserializableAttribute");
        let custom = attribute(&mut b, "Serguard.Annotations.CustomDeserializerAttribute");
        let ignore = attribute(&mut b, "Serguard.Annotations.DeserializationIgnoreAttribute");

        let object = b.declare_special("System.Object", SpecialType::Object).unwrap();
        let string = b.declare_special("System.String", SpecialType::String).unwrap();
        let int32 = b.declare_special("System.Int32", SpecialType::Int32).unwrap();
        let nullable = b
            .declare_generic_type(
                "System.Nullable`1",
                TypeKind::Special(SpecialType::Nullable),
                Origin::Metadata,
                &["T"],
            )
            .unwrap();

        let list = b
            .declare_generic_type("System.Collections.Generic.List`1", TypeKind::Class, Origin::Metadata, &["T"])
            .unwrap();
        let list_t = b.type_parameters(list)[0];
        b.set_element_type(list, list_t);

        let key_value_pair = b
            .declare_generic_type(
                "System.Collections.Generic.KeyValuePair`2",
                TypeKind::Struct,
                Origin::Metadata,
                &["TKey", "TValue"],
            )
            .unwrap();
        let dictionary = b
            .declare_generic_type(
                "System.Collections.Generic.Dictionary`2",
                TypeKind::Class,
                Origin::Metadata,
                &["TKey", "TValue"],
            )
            .unwrap();
        let params = b.type_parameters(dictionary);
        let open_pair = b.instantiate(key_value_pair, &params).unwrap();
        b.set_element_type(dictionary, open_pair);

        Self {
            b,
            k: Known {
                marker,
                pinned,
                structural,
                custom,
                ignore,
                object,
                string,
                int32,
                nullable,
                list,
                key_value_pair,
                dictionary,
            },
        }
    }

    /// A source class without annotations.
    pub fn class(&mut self, name: &str, line: u32) -> TypeId {
        let ty = self.b.declare_type(name, TypeKind::Class, Origin::Source).unwrap();
        self.b.set_type_location(ty, loc(line));
        ty
    }

    /// A source class carrying the structural certification.
    pub fn certified(&mut self, name: &str, line: u32) -> TypeId {
        let ty = self.class(name, line);
        self.b.annotate_type(ty, Annotation::new(self.k.structural));
        ty
    }

    pub fn generic_class(&mut self, name: &str, params: &[&str], line: u32) -> TypeId {
        let ty = self
            .b
            .declare_generic_type(name, TypeKind::Class, Origin::Source, params)
            .unwrap();
        self.b.set_type_location(ty, loc(line));
        for (i, p) in self.b.type_parameters(ty).into_iter().enumerate() {
            self.b.set_type_location(p, Location::new("Fixture.cs", line, 10 + i as u32));
        }
        ty
    }

    pub fn list_of(&mut self, element: TypeId) -> TypeId {
        self.b.instantiate(self.k.list, &[element]).unwrap()
    }

    pub fn dictionary_of(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.b.instantiate(self.k.dictionary, &[key, value]).unwrap()
    }

    pub fn nullable_of(&mut self, ty: TypeId) -> TypeId {
        self.b.instantiate(self.k.nullable, &[ty]).unwrap()
    }

    pub fn mark_type(&mut self, ty: TypeId) {
        self.b.annotate_type(ty, Annotation::new(self.k.marker));
    }

    pub fn mark_symbol(&mut self, symbol: SymbolId) {
        self.b.annotate_symbol(symbol, Annotation::new(self.k.marker));
    }

    /// Parameter with a source location on `line`.
    pub fn param(&mut self, method: SymbolId, name: &str, ty: TypeId, line: u32) -> SymbolId {
        let p = self.b.add_parameter(method, name, ty).unwrap();
        self.b.set_symbol_location(p, loc(line));
        p
    }

    /// `static void Deserialize([RequiresDeserializable] object value)` on a
    /// fresh `Acme.Serializer` class.
    pub fn sink(&mut self) -> SymbolId {
        let host = self.class("Acme.Serializer", 1);
        let method = self.b.add_method(host, "Deserialize");
        let value = self.param(method, "value", self.k.object, 2);
        self.mark_symbol(value);
        method
    }

    pub fn build(self) -> Built {
        let model = self.b.build();
        let policy = build_policy(&model, &AnnotationConfig::default()).expect("fixture declares the annotations");
        Built {
            model,
            policy,
            allow_list: AllowList::empty(),
            k: self.k,
        }
    }
}

pub struct Built {
    pub model: TypeModel,
    pub policy: DeserializabilityPolicy,
    pub allow_list: AllowList,
    pub k: Known,
}

impl Built {
    pub fn allow(mut self, names: &[&str]) -> Self {
        self.allow_list = AllowList::from_names(&self.model, names.iter().copied());
        self
    }

    pub fn predicates(&self) -> Predicates<'_> {
        Predicates::new(&self.model, &self.policy, &self.allow_list)
    }
}

pub fn loc(line: u32) -> Location {
    Location::new("Fixture.cs", line, 1)
}
