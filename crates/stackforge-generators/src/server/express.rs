//! Express + TypeScript API.

use serde_json::{Map, Value, json};
use stackforge_core::{
    application::ports::{Generator, GeneratorOutput},
    domain::{
        ArtifactKind, AuthScheme, Entity, Facet, GenerationContext, ModelFlavor, Operation,
        OperationKind, ServerFramework, StackDescriptor, DatabaseEngine, resolve_operations,
        transform::{ImportSet, SemanticType, TargetSyntax, target_type, to_camel_case},
    },
};
use tracing::instrument;

use super::{is_servable, mutates, with_dependencies};
use crate::support::{CodeWriter, Sink, id_type, payload_fields, pretty_json, quoted, typescript_file};

const ID: &str = "express-server";

/// Generates the `api/` service for Express.
pub struct ExpressGenerator;

impl ExpressGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ExpressGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for ExpressGenerator {
    fn id(&self) -> &'static str {
        ID
    }

    fn facet(&self) -> Facet {
        Facet::Server
    }

    fn supports(&self, descriptor: &StackDescriptor) -> bool {
        descriptor
            .server()
            .is_some_and(|s| s.framework == ServerFramework::Express)
    }

    fn priority(&self) -> i32 {
        100
    }

    fn is_blocking(&self) -> bool {
        true
    }

    #[instrument(skip_all, fields(generator = ID, entities = ctx.entities.len()))]
    fn generate(&self, ctx: &GenerationContext, descriptor: &StackDescriptor) -> GeneratorOutput {
        let mut sink = Sink::new(ID, Facet::Server);
        let entities = sink.valid_entities(ctx);
        let auth = ctx.architecture.auth;
        let port = descriptor.server().map_or(8080, |s| s.port);

        sink.emit("api/package.json", ArtifactKind::Manifest, package_json(ctx, descriptor));
        sink.emit("api/tsconfig.json", ArtifactKind::Config, tsconfig());
        sink.emit("api/src/app.ts", ArtifactKind::EntryPoint, app_ts(ctx, &entities, port));
        if auth.is_enabled() {
            sink.emit("api/src/middleware/auth.ts", ArtifactKind::Middleware, auth_middleware(auth));
        }
        for entity in &entities {
            sink.emit(
                format!("api/src/routes/{}.routes.ts", entity.file_stem()),
                ArtifactKind::Route,
                routes_ts(entity, ctx, auth),
            );
        }
        sink.finish()
    }
}

fn package_json(ctx: &GenerationContext, descriptor: &StackDescriptor) -> String {
    let mut dependencies = Map::new();
    dependencies.insert("cors".into(), json!("^2.8.5"));
    dependencies.insert("express".into(), json!("^4.19.2"));

    let mut dev = Map::new();
    dev.insert("@types/cors".into(), json!("^2.8.17"));
    dev.insert("@types/express".into(), json!("^4.17.21"));
    dev.insert("@types/node".into(), json!("^20.14.0"));
    dev.insert("ts-node-dev".into(), json!("^2.0.0"));
    dev.insert("typescript".into(), json!("^5.5.4"));

    match ctx.architecture.auth {
        AuthScheme::None => {}
        AuthScheme::Jwt => {
            dependencies.insert("jsonwebtoken".into(), json!("^9.0.2"));
            dev.insert("@types/jsonwebtoken".into(), json!("^9.0.6"));
        }
        AuthScheme::EntraId => {
            dependencies.insert("jose".into(), json!("^5.8.0"));
        }
    }

    if let Some(database) = descriptor.database() {
        if descriptor.model_flavor() == ModelFlavor::TypeOrm {
            dependencies.insert("reflect-metadata".into(), json!("^0.2.2"));
            dependencies.insert("typeorm".into(), json!("^0.3.20"));
            let (driver, version) = match database.engine {
                DatabaseEngine::PostgreSql => ("pg", "^8.12.0"),
                DatabaseEngine::AzureSql => ("mssql", "^10.0.4"),
                DatabaseEngine::MySql => ("mysql2", "^3.11.0"),
            };
            dependencies.insert(driver.into(), json!(version));
        }
    }

    let manifest = json!({
        "name": format!("{}-api", ctx.project.package_name()),
        "version": ctx.project.version,
        "private": true,
        "main": "dist/app.js",
        "scripts": {
            "dev": "ts-node-dev --respawn src/app.ts",
            "build": "tsc",
            "start": "node dist/app.js"
        },
        "dependencies": Value::Object(dependencies),
        "devDependencies": Value::Object(dev),
    });
    pretty_json(&manifest)
}

fn tsconfig() -> String {
    pretty_json(&json!({
        "compilerOptions": {
            "target": "ES2022",
            "module": "commonjs",
            "rootDir": "src",
            "outDir": "dist",
            "strict": true,
            "esModuleInterop": true,
            "experimentalDecorators": true,
            "emitDecoratorMetadata": true,
            "skipLibCheck": true
        },
        "include": ["src"]
    }))
}

fn ts_type(ty: &SemanticType) -> &'static str {
    target_type(ty, TargetSyntax::TypeScript)
}

fn router_factory(entity: &Entity) -> String {
    format!("create{}Router", entity.singular())
}

fn app_ts(ctx: &GenerationContext, entities: &[&Entity], port: u16) -> String {
    let mut imports = ImportSet::new();
    imports
        .default_import("express", "express")
        .type_only("express", "Express")
        .default_import("cors", "cors");

    let injected = with_dependencies(entities);
    let mut w = CodeWriter::new();
    w.line(format!("const PORT = Number(process.env.PORT ?? {port});"))
        .blank();

    if !injected.is_empty() {
        w.open("export interface AppDeps {");
        for entity in &injected {
            let module = format!("./routes/{}.routes", entity.file_stem());
            let deps_type = format!("{}RouterDeps", entity.singular());
            imports.type_only(module, deps_type.clone());
            w.line(format!("{}: {deps_type};", entity.camel()));
        }
        w.close("}").blank();
    }

    let signature = if injected.is_empty() {
        "export function createApp(): Express {"
    } else {
        "export function createApp(deps: AppDeps): Express {"
    };
    w.open(signature)
        .line("const app = express();")
        .line("app.use(cors());")
        .line("app.use(express.json());")
        .blank()
        .open("app.get('/health', (_req, res) => {")
        .line("res.json({ status: 'ok' });")
        .close("});")
        .blank();
    for entity in entities {
        let factory = router_factory(entity);
        imports.named(format!("./routes/{}.routes", entity.file_stem()), factory.clone());
        let args = if entity.dependencies.is_empty() {
            String::new()
        } else {
            format!("deps.{}", entity.camel())
        };
        w.line(format!(
            "app.use({}, {factory}({args}));",
            quoted(&format!("/api/{}", entity.route_segment()))
        ));
    }
    if !entities.is_empty() {
        w.blank();
    }
    w.line("return app;").close("}").blank();

    if injected.is_empty() {
        w.open("createApp().listen(PORT, () => {");
    } else {
        w.open("createApp({");
        for entity in &injected {
            let required: Vec<String> = entity
                .dependencies
                .iter()
                .filter(|b| b.is_required())
                .map(|b| format!("{}: null", to_camel_case(&b.name)))
                .collect();
            if required.is_empty() {
                w.line(format!("{}: {{}},", entity.camel()));
            } else {
                w.line(format!("{}: {{ {} }},", entity.camel(), required.join(", ")));
            }
        }
        w.reopen("}).listen(PORT, () => {");
    }
    w.line(format!(
        "console.log(`{} API listening on port ${{PORT}}`);",
        ctx.project.package_name()
    ))
    .close("});");

    typescript_file(&imports, &w.finish())
}

fn auth_middleware(auth: AuthScheme) -> String {
    match auth {
        AuthScheme::EntraId => ENTRA_ID_MIDDLEWARE.to_string(),
        AuthScheme::Jwt | AuthScheme::None => JWT_MIDDLEWARE.to_string(),
    }
}

const JWT_MIDDLEWARE: &str = r#"import jwt from 'jsonwebtoken';
import type { NextFunction, Request, Response } from 'express';

const JWT_SECRET = process.env.JWT_SECRET ?? '';

export function authenticate(req: Request, res: Response, next: NextFunction): void {
  const header = req.headers.authorization ?? '';
  const token = header.startsWith('Bearer ') ? header.slice(7) : '';
  if (!token) {
    res.status(401).json({ error: 'Missing bearer token' });
    return;
  }
  try {
    res.locals.user = jwt.verify(token, JWT_SECRET);
    next();
  } catch {
    res.status(401).json({ error: 'Invalid token' });
  }
}
"#;

const ENTRA_ID_MIDDLEWARE: &str = r#"import { createRemoteJWKSet, jwtVerify } from 'jose';
import type { NextFunction, Request, Response } from 'express';

const TENANT_ID = process.env.AZURE_TENANT_ID ?? 'common';
const AUDIENCE = process.env.AZURE_CLIENT_ID ?? '';
const AUTHORITY = `https://login.microsoftonline.com/${TENANT_ID}`;
const JWKS = createRemoteJWKSet(new URL(`${AUTHORITY}/discovery/v2.0/keys`));

export async function authenticate(req: Request, res: Response, next: NextFunction): Promise<void> {
  const header = req.headers.authorization ?? '';
  const token = header.startsWith('Bearer ') ? header.slice(7) : '';
  if (!token) {
    res.status(401).json({ error: 'Missing bearer token' });
    return;
  }
  try {
    const { payload } = await jwtVerify(token, JWKS, { issuer: `${AUTHORITY}/v2.0`, audience: AUDIENCE });
    res.locals.user = payload;
    next();
  } catch {
    res.status(401).json({ error: 'Invalid token' });
  }
}
"#;

fn routes_ts(entity: &Entity, ctx: &GenerationContext, auth: AuthScheme) -> String {
    let singular = entity.singular();
    let id_ts = ts_type(&id_type(entity));
    let fields = payload_fields(entity, ctx);
    let ops = resolve_operations(entity);
    let stores_items = ops.iter().any(is_servable);
    let creates = ops
        .iter()
        .any(|o| o.kind == OperationKind::Create && is_servable(o));

    let mut imports = ImportSet::new();
    imports
        .named("express", "Router")
        .type_only("express", "Request")
        .type_only("express", "Response")
        .named("node:crypto", "randomUUID")
        .named("../middleware/auth", "authenticate");

    let mut w = CodeWriter::new();
    w.open(format!("export interface {singular} {{"))
        .line(format!("id: {id_ts};"));
    for field in &fields {
        let optional = if field.is_required() { "" } else { "?" };
        w.line(format!("{}{optional}: {};", field.camel_name(), ts_type(&field.ty)));
    }
    w.close("}")
        .blank()
        .line(format!("export type {singular}Input = Omit<{singular}, 'id'>;"))
        .blank();

    let deps_param = if entity.dependencies.is_empty() {
        String::new()
    } else {
        w.open(format!("export interface {singular}RouterDeps {{"));
        for binding in &entity.dependencies {
            let optional = if binding.is_required() { "" } else { "?" };
            w.line(format!(
                "{}{optional}: {}; // {}",
                to_camel_case(&binding.name),
                ts_type(&SemanticType::parse(&binding.ty)),
                binding.ty
            ));
        }
        w.close("}").blank();
        format!("deps: {singular}RouterDeps")
    };

    if creates {
        let required: Vec<String> = fields
            .iter()
            .filter(|f| f.is_required())
            .map(|f| quoted(&f.camel_name()))
            .collect();
        w.line(format!(
            "const REQUIRED_FIELDS: (keyof {singular}Input)[] = [{}];",
            required.join(", ")
        ))
        .blank()
        .open(format!(
            "function missingFields(body: Partial<{singular}Input>): string[] {{"
        ))
        .line("return REQUIRED_FIELDS.filter((field) => body[field] === undefined || body[field] === null);")
        .close("}")
        .blank();
    }

    w.open(format!(
        "export function {}({deps_param}): Router {{",
        router_factory(entity)
    ))
    .line("const router = Router();");
    if stores_items {
        w.line(format!("const items = new Map<string, {singular}>();"));
        if id_ts == "number" {
            w.line("let nextId = 1;");
        }
    }

    for op in &ops {
        w.blank();
        route_handler(&mut w, entity, op, id_ts, auth);
    }

    w.blank().line("return router;").close("}");
    typescript_file(&imports, &w.finish())
}

fn route_handler(w: &mut CodeWriter, entity: &Entity, op: &Operation, id_ts: &str, auth: AuthScheme) {
    let singular = entity.singular();
    let not_found = format!("res.status(404).json({{ error: '{singular} not found' }});");
    let guard = if auth.is_enabled() && mutates(op) {
        "authenticate, "
    } else {
        ""
    };
    let uses_req = is_servable(op) && op.kind != OperationKind::List;
    let req = if uses_req { "req" } else { "_req" };

    if let Some(description) = &op.description {
        w.line(format!("// {}", description.replace('\n', " ")));
    }
    w.open(format!(
        "router.{}({}, {guard}({req}: Request, res: Response) => {{",
        op.method.express_fn(),
        quoted(&op.path)
    ));

    if !is_servable(op) {
        w.line(format!(
            "res.status(501).json({{ error: '{} is not implemented' }});",
            op.name
        ))
        .close("});");
        return;
    }

    match op.kind {
        OperationKind::List => {
            w.line("res.json(Array.from(items.values()));");
        }
        OperationKind::Get => {
            w.line("const item = items.get(req.params.id);")
                .open("if (!item) {")
                .line(&not_found)
                .line("return;")
                .close("}")
                .line("res.json(item);");
        }
        OperationKind::Create => {
            let new_id = if id_ts == "number" { "nextId++" } else { "randomUUID()" };
            w.line("const missing = missingFields(req.body);")
                .open("if (missing.length > 0) {")
                .line("res.status(400).json({ error: 'Missing required fields', fields: missing });")
                .line("return;")
                .close("}")
                .line(format!("const item: {singular} = {{ ...req.body, id: {new_id} }};"))
                .line("items.set(String(item.id), item);")
                .line("res.status(201).json(item);");
        }
        OperationKind::Update => {
            w.line("const existing = items.get(req.params.id);")
                .open("if (!existing) {")
                .line(&not_found)
                .line("return;")
                .close("}")
                .line(format!(
                    "const item: {singular} = {{ ...existing, ...req.body, id: existing.id }};"
                ))
                .line("items.set(req.params.id, item);")
                .line("res.json(item);");
        }
        OperationKind::Delete => {
            w.open("if (!items.delete(req.params.id)) {")
                .line(&not_found)
                .line("return;")
                .close("}")
                .line("res.status(204).send();");
        }
        OperationKind::Custom => {}
    }
    w.close("});");
}
