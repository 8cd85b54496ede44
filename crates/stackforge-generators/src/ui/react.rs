//! React single-page client (Vite + TypeScript).

use serde_json::{Map, Value, json};
use stackforge_core::{
    application::ports::{Generator, GeneratorOutput},
    domain::{
        ArtifactKind, AuthScheme, ComponentSpec, Entity, Facet, Field, GenerationContext,
        HttpMethod, Operation, OperationKind, StackDescriptor, StateManagement, Styling,
        UiFramework, resolve_operations,
        transform::{ImportSet, SemanticType, TargetSyntax, input_type, target_type, to_camel_case},
    },
};
use tracing::instrument;

use crate::support::{
    CodeWriter, Sink, id_type, label, payload_fields, pretty_json, quoted, typescript_file,
};

const ID: &str = "react-ui";
const DEFAULT_API_PORT: u16 = 8080;

/// Generates the `web/` client.
pub struct ReactGenerator;

impl ReactGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReactGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for ReactGenerator {
    fn id(&self) -> &'static str {
        ID
    }

    fn facet(&self) -> Facet {
        Facet::Ui
    }

    fn supports(&self, descriptor: &StackDescriptor) -> bool {
        descriptor
            .ui()
            .is_some_and(|ui| ui.framework == UiFramework::React)
    }

    fn priority(&self) -> i32 {
        60
    }

    #[instrument(skip_all, fields(generator = ID, entities = ctx.entities.len(), components = ctx.components.len()))]
    fn generate(&self, ctx: &GenerationContext, descriptor: &StackDescriptor) -> GeneratorOutput {
        let mut sink = Sink::new(ID, Facet::Ui);
        let entities = sink.valid_entities(ctx);
        let components = sink.valid_components(ctx);
        let arch = ctx.architecture;
        let api_port = descriptor.server().map_or(DEFAULT_API_PORT, |s| s.port);

        sink.emit("web/package.json", ArtifactKind::Manifest, package_json(ctx));
        sink.emit("web/tsconfig.json", ArtifactKind::Config, tsconfig());
        sink.emit("web/vite.config.ts", ArtifactKind::Config, vite_config(api_port));
        sink.emit("web/index.html", ArtifactKind::Markup, index_html(&ctx.project.name));
        sink.emit("web/src/index.css", ArtifactKind::Stylesheet, index_css(arch.styling));
        if arch.styling == Styling::Tailwind {
            sink.emit("web/tailwind.config.js", ArtifactKind::Config, TAILWIND_CONFIG.into());
            sink.emit("web/postcss.config.js", ArtifactKind::Config, POSTCSS_CONFIG.into());
        }
        sink.emit("web/src/main.tsx", ArtifactKind::EntryPoint, main_tsx(arch.state));
        sink.emit("web/src/api/client.ts", ArtifactKind::ApiClient, api_client(arch.auth));
        for entity in &entities {
            sink.emit(
                format!("web/src/api/{}.ts", entity.file_stem()),
                ArtifactKind::ApiClient,
                entity_api(entity, ctx),
            );
        }
        sink.emit("web/src/state/store.ts", ArtifactKind::State, store(arch.state, &entities));

        let mut rendered = Vec::with_capacity(components.len());
        for component in components {
            let entity = match &component.entity {
                Some(name) => {
                    let wanted = ctx.entity(name).map(Entity::singular);
                    match entities.iter().find(|e| Some(e.singular()) == wanted) {
                        Some(entity) => Some(*entity),
                        None => {
                            sink.fail(
                                component.name.as_str(),
                                format!("entity '{name}' could not be rendered"),
                            );
                            continue;
                        }
                    }
                }
                None => None,
            };

            let name = component.pascal_name();
            sink.emit(
                format!("web/src/components/{name}.tsx"),
                ArtifactKind::Component,
                component_tsx(component, entity, ctx),
            );
            if arch.styling == Styling::CssModules {
                sink.emit(
                    format!("web/src/components/{name}.module.css"),
                    ArtifactKind::Stylesheet,
                    MODULE_CSS.into(),
                );
            }
            rendered.push(component);
        }

        sink.emit("web/src/App.tsx", ArtifactKind::Page, app_tsx(ctx, &rendered));
        sink.finish()
    }
}

// ── Project files ────────────────────────────────────────────────────────────

fn package_json(ctx: &GenerationContext) -> String {
    let arch = ctx.architecture;
    let mut dependencies = Map::new();
    dependencies.insert("react".into(), json!("^18.3.1"));
    dependencies.insert("react-dom".into(), json!("^18.3.1"));
    match arch.state {
        StateManagement::Context => {}
        StateManagement::Redux => {
            dependencies.insert("@reduxjs/toolkit".into(), json!("^2.2.7"));
            dependencies.insert("react-redux".into(), json!("^9.1.2"));
        }
        StateManagement::Zustand => {
            dependencies.insert("zustand".into(), json!("^4.5.5"));
        }
    }

    let mut dev = Map::new();
    dev.insert("@types/react".into(), json!("^18.3.5"));
    dev.insert("@types/react-dom".into(), json!("^18.3.0"));
    dev.insert("@vitejs/plugin-react".into(), json!("^4.3.1"));
    dev.insert("typescript".into(), json!("^5.5.4"));
    dev.insert("vite".into(), json!("^5.4.3"));
    if arch.styling == Styling::Tailwind {
        dev.insert("autoprefixer".into(), json!("^10.4.20"));
        dev.insert("postcss".into(), json!("^8.4.45"));
        dev.insert("tailwindcss".into(), json!("^3.4.10"));
    }

    let mut manifest = json!({
        "name": format!("{}-web", ctx.project.package_name()),
        "version": ctx.project.version,
        "private": true,
        "type": "module",
        "scripts": {
            "dev": "vite",
            "build": "tsc && vite build",
            "preview": "vite preview"
        },
        "dependencies": Value::Object(dependencies),
        "devDependencies": Value::Object(dev),
    });
    if !ctx.project.description.is_empty() {
        manifest["description"] = json!(ctx.project.description);
    }
    pretty_json(&manifest)
}

fn tsconfig() -> String {
    pretty_json(&json!({
        "compilerOptions": {
            "target": "ES2020",
            "lib": ["DOM", "DOM.Iterable", "ES2020"],
            "module": "ESNext",
            "moduleResolution": "bundler",
            "jsx": "react-jsx",
            "strict": true,
            "noEmit": true,
            "isolatedModules": true,
            "skipLibCheck": true,
            "types": ["vite/client"]
        },
        "include": ["src"]
    }))
}

fn vite_config(api_port: u16) -> String {
    format!(
        r#"import {{ defineConfig }} from 'vite';
import react from '@vitejs/plugin-react';

export default defineConfig({{
  plugins: [react()],
  server: {{
    proxy: {{
      '/api': 'http://localhost:{api_port}',
    }},
  }},
}});
"#
    )
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn index_html(title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>{}</title>
  </head>
  <body>
    <div id="root"></div>
    <script type="module" src="/src/main.tsx"></script>
  </body>
</html>
"#,
        html_escape(title)
    )
}

fn index_css(styling: Styling) -> String {
    match styling {
        Styling::Tailwind => "@tailwind base;\n@tailwind components;\n@tailwind utilities;\n".into(),
        Styling::CssModules => r#":root {
  font-family: system-ui, sans-serif;
  color: #1f2933;
}

body {
  margin: 0;
}

main {
  max-width: 960px;
  margin: 0 auto;
  padding: 2rem 1rem;
}
"#
        .into(),
    }
}

const TAILWIND_CONFIG: &str = r#"/** @type {import('tailwindcss').Config} */
export default {
  content: ['./index.html', './src/**/*.{ts,tsx}'],
  theme: {
    extend: {},
  },
  plugins: [],
};
"#;

const POSTCSS_CONFIG: &str = r#"export default {
  plugins: {
    tailwindcss: {},
    autoprefixer: {},
  },
};
"#;

const MODULE_CSS: &str = r#".container {
  display: flex;
  flex-direction: column;
  gap: 1rem;
}

.table {
  width: 100%;
  border-collapse: collapse;
}

.form {
  display: flex;
  flex-wrap: wrap;
  gap: 0.5rem;
  align-items: flex-end;
}

.error {
  color: #b00020;
}
"#;

/// Styled regions of a generated component.
#[derive(Clone, Copy)]
enum Slot {
    Container,
    Table,
    Form,
    Error,
}

impl Slot {
    const fn module_class(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Table => "table",
            Self::Form => "form",
            Self::Error => "error",
        }
    }

    const fn utility_classes(self) -> &'static str {
        match self {
            Self::Container => "flex flex-col gap-4",
            Self::Table => "w-full border-collapse",
            Self::Form => "flex flex-wrap items-end gap-2",
            Self::Error => "text-red-700",
        }
    }

    fn attr(self, styling: Styling) -> String {
        match styling {
            Styling::CssModules => format!("className={{styles.{}}}", self.module_class()),
            Styling::Tailwind => format!("className=\"{}\"", self.utility_classes()),
        }
    }
}

// ── Entry point & API client ─────────────────────────────────────────────────

fn main_tsx(state: StateManagement) -> String {
    let mut imports = ImportSet::new();
    imports
        .named("react", "StrictMode")
        .named("react-dom/client", "createRoot")
        .default_import("./App", "App");

    let mut w = CodeWriter::new();
    w.line("const container = document.getElementById('root');")
        .open("if (!container) {")
        .line("throw new Error('Root element not found');")
        .close("}")
        .blank()
        .open("createRoot(container).render(")
        .open("<StrictMode>");
    match state {
        StateManagement::Context => {
            imports.named("./state/store", "AppStateProvider");
            w.open("<AppStateProvider>")
                .line("<App />")
                .close("</AppStateProvider>");
        }
        StateManagement::Redux => {
            imports
                .named("react-redux", "Provider")
                .named("./state/store", "store");
            w.open("<Provider store={store}>").line("<App />").close("</Provider>");
        }
        StateManagement::Zustand => {
            w.line("<App />");
        }
    }
    w.close("</StrictMode>,").close(");");

    let body = w.finish();
    let head = imports.retain_referenced(&body).render_typescript();
    format!("{head}import './index.css';\n\n{body}")
}

fn api_client(auth: AuthScheme) -> String {
    let token = if auth.is_enabled() {
        r#"  const token = localStorage.getItem('accessToken');
  if (token) {
    headers.set('Authorization', `Bearer ${token}`);
  }
"#
    } else {
        ""
    };
    format!(
        r#"const API_BASE = '/api';

export class ApiError extends Error {{
  readonly status: number;

  constructor(status: number, message: string) {{
    super(message);
    this.status = status;
  }}
}}

export async function request<T>(path: string, init: RequestInit = {{}}): Promise<T> {{
  const headers = new Headers(init.headers);
  headers.set('Content-Type', 'application/json');
{token}  const response = await fetch(`${{API_BASE}}${{path}}`, {{ ...init, headers }});
  if (!response.ok) {{
    throw new ApiError(response.status, `${{init.method ?? 'GET'}} ${{path}} failed with status ${{response.status}}`);
  }}
  if (response.status === 204) {{
    return undefined as T;
  }}
  return (await response.json()) as T;
}}
"#
    )
}

fn ts_type(ty: &SemanticType) -> &'static str {
    target_type(ty, TargetSyntax::TypeScript)
}

fn entity_api(entity: &Entity, ctx: &GenerationContext) -> String {
    let singular = entity.singular();
    let id_ts = ts_type(&id_type(entity));

    let mut w = CodeWriter::new();
    w.open(format!("export interface {singular} {{"))
        .line(format!("id: {id_ts};"));
    for field in payload_fields(entity, ctx) {
        let optional = if field.is_required() { "" } else { "?" };
        w.line(format!("{}{optional}: {};", field.camel_name(), ts_type(&field.ty)));
    }
    w.close("}")
        .blank()
        .line(format!("export type {singular}Input = Omit<{singular}, 'id'>;"))
        .blank()
        .line(format!(
            "const BASE = {};",
            quoted(&format!("/{}", entity.route_segment()))
        ));

    for op in resolve_operations(entity) {
        w.blank();
        api_function(&mut w, &singular, &op, id_ts);
    }

    let mut imports = ImportSet::new();
    imports.named("./client", "request");
    typescript_file(&imports, &w.finish())
}

fn api_function(w: &mut CodeWriter, singular: &str, op: &Operation, id_ts: &str) {
    let mut params: Vec<String> = op
        .path_params()
        .into_iter()
        .map(|p| format!("{p}: {}", if p == "id" { id_ts } else { "string" }))
        .collect();

    let (returns, body) = match op.kind {
        OperationKind::List => (format!("{singular}[]"), None),
        OperationKind::Get => (singular.to_string(), None),
        OperationKind::Create | OperationKind::Update => (
            singular.to_string(),
            Some(("input", format!("input: {singular}Input"))),
        ),
        OperationKind::Delete => ("void".to_string(), None),
        OperationKind::Custom => (
            "unknown".to_string(),
            Some(("payload", "payload: unknown = {}".to_string())),
        ),
    };
    let body = body.filter(|_| op.method.has_body());
    if let Some((_, param)) = &body {
        params.push(param.clone());
    }

    let url = match op.template_literal_path() {
        path if path.is_empty() => "BASE".to_string(),
        path => format!("`${{BASE}}{path}`"),
    };
    let mut init = Vec::new();
    if op.method != HttpMethod::Get {
        init.push(format!("method: '{}'", op.method.as_str()));
    }
    if let Some((arg, _)) = &body {
        init.push(format!("body: JSON.stringify({arg})"));
    }
    let init = if init.is_empty() {
        String::new()
    } else {
        format!(", {{ {} }}", init.join(", "))
    };

    if let Some(description) = &op.description {
        w.line(format!("/** {} */", description.replace("*/", "* /")));
    }
    w.open(format!(
        "export function {}({}): Promise<{returns}> {{",
        op.name,
        params.join(", ")
    ))
    .line(format!("return request<{returns}>({url}{init});"))
    .close("}");
}

// ── State ────────────────────────────────────────────────────────────────────

struct Collection {
    singular: String,
    /// `invoices`
    key: String,
    /// `setInvoices`
    setter: String,
}

impl Collection {
    fn of(entity: &Entity) -> Self {
        Self {
            singular: entity.singular(),
            key: to_camel_case(&entity.plural()),
            setter: format!("set{}", entity.plural()),
        }
    }
}

fn store(state: StateManagement, entities: &[&Entity]) -> String {
    let collections: Vec<Collection> = entities.iter().map(|e| Collection::of(e)).collect();
    let mut imports = ImportSet::new();
    for entity in entities {
        imports.type_only(format!("../api/{}", entity.file_stem()), entity.singular());
    }

    let mut w = CodeWriter::new();
    match state {
        StateManagement::Context => context_store(&mut w, &mut imports, &collections),
        StateManagement::Redux => redux_store(&mut w, &mut imports, &collections),
        StateManagement::Zustand => zustand_store(&mut w, &mut imports, &collections),
    }
    typescript_file(&imports, &w.finish())
}

fn state_interface(w: &mut CodeWriter, collections: &[Collection]) {
    w.open("export interface AppState {");
    for c in collections {
        w.line(format!("{}: {}[];", c.key, c.singular))
            .line(format!("{}: (items: {}[]) => void;", c.setter, c.singular));
    }
    w.close("}");
}

fn context_store(w: &mut CodeWriter, imports: &mut ImportSet, collections: &[Collection]) {
    imports
        .named_all(
            "react",
            ["createContext", "createElement", "useContext", "useMemo", "useState"],
        )
        .type_only("react", "ReactNode");

    state_interface(w, collections);
    w.blank()
        .line("const AppStateContext = createContext<AppState | null>(null);")
        .blank()
        .open("export function AppStateProvider({ children }: { children: ReactNode }) {");
    for c in collections {
        w.line(format!(
            "const [{}, {}] = useState<{}[]>([]);",
            c.key, c.setter, c.singular
        ));
    }
    let members: Vec<&str> = collections
        .iter()
        .flat_map(|c| [c.key.as_str(), c.setter.as_str()])
        .collect();
    let deps: Vec<&str> = collections.iter().map(|c| c.key.as_str()).collect();
    w.line(format!(
        "const value = useMemo<AppState>(() => ({{ {} }}), [{}]);",
        members.join(", "),
        deps.join(", ")
    ))
    .line("return createElement(AppStateContext.Provider, { value }, children);")
    .close("}")
    .blank()
    .open("export function useAppState(): AppState {")
    .line("const state = useContext(AppStateContext);")
    .open("if (!state) {")
    .line("throw new Error('useAppState must be used inside AppStateProvider');")
    .close("}")
    .line("return state;")
    .close("}");
}

fn redux_store(w: &mut CodeWriter, imports: &mut ImportSet, collections: &[Collection]) {
    imports
        .named_all("@reduxjs/toolkit", ["configureStore", "createSlice"])
        .type_only("@reduxjs/toolkit", "PayloadAction")
        .named_all("react-redux", ["useDispatch", "useSelector"]);

    for c in collections {
        w.open(format!("const {}Slice = createSlice({{", c.key))
            .line(format!("name: '{}',", c.key))
            .line(format!("initialState: [] as {}[],", c.singular))
            .open("reducers: {")
            .line(format!(
                "{}: (_state, action: PayloadAction<{}[]>) => action.payload,",
                c.setter, c.singular
            ))
            .close("},")
            .close("});")
            .blank()
            .line(format!(
                "export const {{ {} }} = {}Slice.actions;",
                c.setter, c.key
            ))
            .blank();
    }

    w.open("export const store = configureStore({").open("reducer: {");
    for c in collections {
        w.line(format!("{}: {}Slice.reducer,", c.key, c.key));
    }
    w.close("},")
        .close("});")
        .blank()
        .line("export type RootState = ReturnType<typeof store.getState>;")
        .line("export type AppDispatch = typeof store.dispatch;")
        .blank()
        .line("export const useAppDispatch = useDispatch.withTypes<AppDispatch>();")
        .line("export const useAppSelector = useSelector.withTypes<RootState>();");
}

fn zustand_store(w: &mut CodeWriter, imports: &mut ImportSet, collections: &[Collection]) {
    imports.named("zustand", "create");

    state_interface(w, collections);
    w.blank()
        .open("export const useAppStore = create<AppState>()((set) => ({");
    for c in collections {
        w.line(format!("{}: [],", c.key))
            .line(format!("{}: (items) => set({{ {}: items }}),", c.setter, c.key));
    }
    w.close("}));");
}

/// Lines binding `items` and `replaceItems` to the entity's collection.
fn state_binding(state: StateManagement, entity: &Entity, imports: &mut ImportSet) -> Vec<String> {
    let c = Collection::of(entity);
    match state {
        StateManagement::Context => {
            imports.named("../state/store", "useAppState");
            vec![format!(
                "const {{ {}: items, {}: replaceItems }} = useAppState();",
                c.key, c.setter
            )]
        }
        StateManagement::Zustand => {
            imports.named("../state/store", "useAppStore");
            vec![
                format!("const items = useAppStore((state) => state.{});", c.key),
                format!("const replaceItems = useAppStore((state) => state.{});", c.setter),
            ]
        }
        StateManagement::Redux => {
            imports
                .named_all("../state/store", ["useAppDispatch", "useAppSelector"])
                .named("../state/store", c.setter.clone())
                .named("react", "useCallback");
            vec![
                format!("const items = useAppSelector((state) => state.{});", c.key),
                "const dispatch = useAppDispatch();".to_string(),
                format!(
                    "const replaceItems = useCallback((next: {}[]) => dispatch({}(next)), [dispatch]);",
                    c.singular, c.setter
                ),
            ]
        }
    }
}

// ── Components ───────────────────────────────────────────────────────────────

struct Prop {
    name: String,
    optional: bool,
    ty: &'static str,
    is_provider: bool,
}

fn component_props(component: &ComponentSpec) -> Vec<Prop> {
    let props = component.props.iter().map(|p| Prop {
        name: p.camel_name(),
        optional: !p.is_required(),
        ty: ts_type(&p.ty),
        is_provider: false,
    });
    let providers = component.providers.iter().map(|b| Prop {
        name: to_camel_case(&b.name),
        optional: !b.is_required(),
        ty: ts_type(&SemanticType::parse(&b.ty)),
        is_provider: true,
    });
    props.chain(providers).collect()
}

fn component_tsx(component: &ComponentSpec, entity: Option<&Entity>, ctx: &GenerationContext) -> String {
    let arch = ctx.architecture;
    let name = component.pascal_name();
    let props = component_props(component);
    let mut imports = ImportSet::new();
    if arch.styling == Styling::CssModules {
        imports.default_import(format!("./{name}.module.css"), "styles");
    }

    let mut w = CodeWriter::new();
    if !props.is_empty() {
        w.open(format!("export interface {name}Props {{"));
        for p in &props {
            let optional = if p.optional { "?" } else { "" };
            w.line(format!("{}{optional}: {};", p.name, p.ty));
        }
        w.close("}").blank();
    }

    let signature = if props.is_empty() {
        format!("export function {name}() {{")
    } else {
        let names: Vec<&str> = props.iter().map(|p| p.name.as_str()).collect();
        format!("export function {name}({{ {} }}: {name}Props) {{", names.join(", "))
    };
    let heading = if props.iter().any(|p| p.name == "title" && !p.is_provider) {
        "{title}".to_string()
    } else {
        label(&component.name)
    };

    match entity {
        Some(entity) => entity_component(&mut w, &mut imports, entity, ctx, &signature, &heading),
        None => static_component(&mut w, &props, arch.styling, &signature, &heading),
    }
    typescript_file(&imports, &w.finish())
}

fn static_component(w: &mut CodeWriter, props: &[Prop], styling: Styling, signature: &str, heading: &str) {
    let details: Vec<&Prop> = props
        .iter()
        .filter(|p| !p.is_provider && p.name != "title")
        .collect();

    w.open(signature)
        .open("return (")
        .open(format!("<section {}>", Slot::Container.attr(styling)))
        .line(format!("<h2>{heading}</h2>"));
    if !details.is_empty() {
        w.open("<dl>");
        for p in details {
            w.line(format!("<dt>{}</dt>", label(&p.name)))
                .line(format!("<dd>{{String({} ?? '')}}</dd>", p.name));
        }
        w.close("</dl>");
    }
    w.close("</section>").close(");").close("}");
}

/// Initial draft value for a required field of TypeScript type `ty`.
fn draft_default(ty: &'static str) -> &'static str {
    match ty {
        "string" => "''",
        "number" => "0",
        "boolean" => "false",
        "any" => "null",
        _ => "{}",
    }
}

fn form_control(field: &Field) -> Option<String> {
    let key = field.camel_name();
    let required = if field.is_required() { " required" } else { "" };
    let control = match ts_type(&field.ty) {
        "boolean" => format!(
            "<input type=\"checkbox\" checked={{Boolean(draft.{key})}} onChange={{(event) => setDraft({{ ...draft, {key}: event.target.checked }})}} />"
        ),
        "number" => format!(
            "<input type=\"number\"{required} value={{draft.{key} ?? ''}} onChange={{(event) => setDraft({{ ...draft, {key}: Number(event.target.value) }})}} />"
        ),
        "string" => format!(
            "<input type=\"{}\"{required} value={{draft.{key} ?? ''}} onChange={{(event) => setDraft({{ ...draft, {key}: event.target.value }})}} />",
            input_type(&field.ty)
        ),
        _ => return None,
    };
    Some(control)
}

fn cell(field: &Field) -> String {
    let key = field.camel_name();
    match ts_type(&field.ty) {
        "string" | "number" | "boolean" => format!("<td>{{String(item.{key} ?? '')}}</td>"),
        _ => format!("<td>{{JSON.stringify(item.{key})}}</td>"),
    }
}

fn entity_component(
    w: &mut CodeWriter,
    imports: &mut ImportSet,
    entity: &Entity,
    ctx: &GenerationContext,
    signature: &str,
    heading: &str,
) {
    let arch = ctx.architecture;
    let singular = entity.singular();
    let api_module = format!("../api/{}", entity.file_stem());
    let id_ts = ts_type(&id_type(entity));
    let fields = payload_fields(entity, ctx);
    let ops = resolve_operations(entity);

    let list = ops
        .iter()
        .find(|o| o.kind == OperationKind::List && o.path_params().is_empty());
    let create = ops.iter().find(|o| {
        o.kind == OperationKind::Create && o.path_params().is_empty() && o.method.has_body()
    });
    let delete = ops
        .iter()
        .find(|o| o.kind == OperationKind::Delete && o.path_params() == ["id"]);

    for op in [list, create, delete].into_iter().flatten() {
        imports.named(api_module.as_str(), op.name.clone());
    }
    imports
        .type_only(api_module.as_str(), singular.clone())
        .type_only(api_module.as_str(), format!("{singular}Input"))
        .named("react", "useState");

    if create.is_some() {
        imports.type_only("react", "FormEvent");
        w.open(format!("const EMPTY_DRAFT: {singular}Input = {{"));
        for field in fields.iter().filter(|f| f.is_required()) {
            w.line(format!(
                "{}: {},",
                field.camel_name(),
                draft_default(ts_type(&field.ty))
            ));
        }
        w.close("};").blank();
    }

    w.open(signature);
    for line in state_binding(arch.state, entity, imports) {
        w.line(line);
    }
    w.line("const [error, setError] = useState<string | null>(null);");
    if create.is_some() {
        w.line(format!(
            "const [draft, setDraft] = useState<{singular}Input>(EMPTY_DRAFT);"
        ));
    }

    if let Some(list) = list {
        imports.named("react", "useEffect");
        w.blank()
            .open("useEffect(() => {")
            .line(format!("{}()", list.name))
            .line("  .then(replaceItems)")
            .line("  .catch((e: Error) => setError(e.message));")
            .close("}, [replaceItems]);");
    }

    if let Some(create) = create {
        w.blank()
            .open("async function handleCreate(event: FormEvent<HTMLFormElement>) {")
            .line("event.preventDefault();")
            .open("try {")
            .line(format!("const created = await {}(draft);", create.name))
            .line("replaceItems([...items, created]);")
            .line("setDraft(EMPTY_DRAFT);")
            .reopen("} catch (e) {")
            .line("setError((e as Error).message);")
            .close("}")
            .close("}");
    }

    if let Some(delete) = delete {
        w.blank()
            .open(format!("async function handleDelete(id: {id_ts}) {{"))
            .open("try {")
            .line(format!("await {}(id);", delete.name))
            .line("replaceItems(items.filter((item) => item.id !== id));")
            .reopen("} catch (e) {")
            .line("setError((e as Error).message);")
            .close("}")
            .close("}");
    }

    w.blank()
        .open("return (")
        .open(format!("<section {}>", Slot::Container.attr(arch.styling)))
        .line(format!("<h2>{heading}</h2>"))
        .line(format!(
            "{{error && <p {}>{{error}}</p>}}",
            Slot::Error.attr(arch.styling)
        ))
        .open(format!("<table {}>", Slot::Table.attr(arch.styling)))
        .open("<thead>")
        .open("<tr>");
    for field in &fields {
        w.line(format!("<th>{}</th>", label(&field.name)));
    }
    if delete.is_some() {
        w.line("<th />");
    }
    w.close("</tr>")
        .close("</thead>")
        .open("<tbody>")
        .open("{items.map((item) => (")
        .open("<tr key={String(item.id)}>");
    for field in &fields {
        w.line(cell(field));
    }
    if delete.is_some() {
        w.line("<td>")
            .line("  <button type=\"button\" onClick={() => handleDelete(item.id)}>Delete</button>")
            .line("</td>");
    }
    w.close("</tr>")
        .close("))}")
        .close("</tbody>")
        .close("</table>");

    if create.is_some() {
        w.open(format!(
            "<form {} onSubmit={{handleCreate}}>",
            Slot::Form.attr(arch.styling)
        ));
        for field in &fields {
            if let Some(control) = form_control(field) {
                w.open("<label>")
                    .line(label(&field.name))
                    .line(control)
                    .close("</label>");
            }
        }
        w.line(format!("<button type=\"submit\">Add {}</button>", label(&singular)))
            .close("</form>");
    }

    w.close("</section>").close(");").close("}");
}

// ── App shell ────────────────────────────────────────────────────────────────

/// JSX attribute supplying a placeholder for a required prop.
fn placeholder(prop: &Prop) -> String {
    match prop.ty {
        "string" => format!("{}=\"{}\"", prop.name, label(&prop.name)),
        "number" => format!("{}={{0}}", prop.name),
        "boolean" => format!("{}={{false}}", prop.name),
        "any" => format!("{}={{null}}", prop.name),
        _ => format!("{}={{{{}}}}", prop.name),
    }
}

fn app_tsx(ctx: &GenerationContext, components: &[&ComponentSpec]) -> String {
    let mut imports = ImportSet::new();
    let mut w = CodeWriter::new();
    w.line(format!("const APP_TITLE = {};", quoted(&ctx.project.name)))
        .blank()
        .open("export default function App() {")
        .open("return (")
        .open("<main>")
        .line("<h1>{APP_TITLE}</h1>");
    for component in components {
        let name = component.pascal_name();
        imports.named(format!("./components/{name}"), name.clone());
        let attrs: Vec<String> = component_props(component)
            .iter()
            .filter(|p| !p.optional)
            .map(placeholder)
            .collect();
        if attrs.is_empty() {
            w.line(format!("<{name} />"));
        } else {
            w.line(format!("<{name} {} />", attrs.join(" ")));
        }
    }
    w.close("</main>").close(");").close("}");
    typescript_file(&imports, &w.finish())
}
